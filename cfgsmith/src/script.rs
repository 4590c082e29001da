// CfgSmith: Template-Based Network Device Configuration Compiler
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Configuration Scripts
//! The output of the generation engine: an ordered list of CLI commands, each remembering the
//! block depth at which it was emitted.

use serde::{Deserialize, Serialize};

/// A single command of the configuration script
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CliLine {
    /// Block depth: 0 for global commands, 1 inside an `interface` (or similar) block, 2 inside a
    /// nested block (e.g., `address-family`)
    pub depth: usize,
    /// Command text, without indentation
    pub text: String,
}

/// Ordered sequence of CLI commands
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigScript {
    lines: Vec<CliLine>,
}

impl ConfigScript {
    /// Create an empty script
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands in order, without indentation
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.lines.iter().map(|l| l.text.as_str())
    }

    /// All commands together with their depth
    pub fn cli_lines(&self) -> &[CliLine] {
        &self.lines
    }

    /// Consume the script and return the commands
    pub fn into_commands(self) -> Vec<String> {
        self.lines.into_iter().map(|l| l.text).collect()
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if the script contains no command
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Position of the first command equal to `text`
    pub fn position(&self, text: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.text == text)
    }

    /// Returns `true` if some command is equal to `text`
    pub fn contains(&self, text: &str) -> bool {
        self.position(text).is_some()
    }
}

/// Writes commands into a [`ConfigScript`], tracking the current block depth.
#[derive(Debug, Default)]
pub(crate) struct ScriptWriter {
    script: ConfigScript,
    depth: usize,
}

impl ScriptWriter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Emit a command at the current depth.
    pub(crate) fn line(&mut self, text: impl Into<String>) {
        self.script.lines.push(CliLine { depth: self.depth, text: text.into() });
    }

    /// Emit a command opening a sub-block.
    pub(crate) fn enter(&mut self, text: impl Into<String>) {
        self.line(text);
        self.depth += 1;
    }

    /// Close the current sub-block with `exit`.
    pub(crate) fn exit(&mut self) {
        self.exit_with("exit");
    }

    /// Close the current sub-block with a specific command.
    pub(crate) fn exit_with(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    pub(crate) fn finish(self) -> ConfigScript {
        self.script
    }
}
