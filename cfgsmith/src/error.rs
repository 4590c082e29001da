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

//! Module containing the main error type

use crate::project::ProjectError;
use crate::types::{ConstructionError, GenerationPreconditionError, RegistryError};
use thiserror::Error;

/// Main error type
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A field value was rejected
    #[error("Construction Error: {0}")]
    Construction(#[from] ConstructionError),
    /// Error of the interface registry
    #[error("Registry Error: {0}")]
    Registry(#[from] RegistryError),
    /// Generation was requested for an invalid template graph
    #[error("{0}")]
    Precondition(#[from] GenerationPreconditionError),
    /// Error of a project operation
    #[error("{0}")]
    Project(#[from] ProjectError),
}

impl From<crate::types::UnknownInterfaceError> for Error {
    fn from(cause: crate::types::UnknownInterfaceError) -> Self {
        Self::Registry(RegistryError::UnknownInterface(cause))
    }
}
