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


use cfgsmith::printer::{self, ExportOptions};
use cfgsmith::project::ProjectError;
use cfgsmith::validate::NativeVlanPolicy;
use cfgsmith::{catalog, DeviceId, Project};

use clap::{Parser, Subcommand};
use log::*;
use std::error::Error;
use std::path::{Path, PathBuf};

mod project_file;
use project_file::ProjectFile;

fn main() -> Result<(), Box<dyn Error>> {
    // initialize the env logger
    pretty_env_logger::init();
    // run clap
    let args = CommandLineArguments::parse();

    match args.cmd {
        MainCommand::Generate {
            project,
            device,
            indent,
            enable,
            save,
            native_vlan_policy,
            output,
        } => {
            let mut project = load(&project, native_vlan_policy)?;
            let options = ExportOptions { indent, privileged_prelude: enable, save };
            let devices = select(&project, device.as_deref())?;
            let mut rejected = 0;
            for id in devices.iter().copied() {
                let hostname = hostname(&project, id);
                let script = match project.apply(id) {
                    Ok(script) => printer::script(script, &options),
                    Err(ProjectError::Rejected(e)) => {
                        error!("{} cannot be generated:", hostname);
                        for line in printer::violations(&e.violations) {
                            error!("    {}", line);
                        }
                        rejected += 1;
                        continue;
                    }
                    Err(e) => return Err(e.into()),
                };
                match &output {
                    Some(dir) => {
                        let path = dir.join(format!("{}.cfg", hostname));
                        std::fs::write(&path, script)?;
                        info!("Wrote {}", path.display());
                    }
                    None if devices.len() > 1 => print!("! {}\n{}", hostname, script),
                    None => print!("{}", script),
                }
            }
            if rejected > 0 {
                return Err(format!("{} of {} devices failed validation", rejected, devices.len())
                    .into());
            }
        }
        MainCommand::Validate { project, device, native_vlan_policy } => {
            let project = load(&project, native_vlan_policy)?;
            let mut total = 0;
            for id in select(&project, device.as_deref())? {
                let violations = project.validate(id)?;
                if violations.is_empty() {
                    println!("{}: ok", hostname(&project, id));
                } else {
                    println!("{}: {} violation(s)", hostname(&project, id), violations.len());
                    for line in printer::violations(&violations) {
                        println!("    {}", line);
                    }
                }
                total += violations.len();
            }
            if total > 0 {
                return Err(format!("{} violation(s) found", total).into());
            }
        }
        MainCommand::Models => {
            for model in catalog::all() {
                println!("{}", printer::model(&model));
            }
        }
        MainCommand::Export { project } => {
            let project = load(&project, None)?;
            println!("{}", serde_json::to_string_pretty(&ProjectFile::from_project(&project))?);
        }
    }

    Ok(())
}

/// Read the project file, overriding the native VLAN policy if requested.
fn load(path: &Path, policy: Option<NativeVlanPolicy>) -> Result<Project, Box<dyn Error>> {
    let mut project = ProjectFile::read(path)?.into_project()?;
    if let Some(policy) = policy {
        let mut options = *project.options();
        options.native_vlan_policy = policy;
        project.set_options(options);
    }
    Ok(project)
}

/// Either the device with the given hostname, or all devices of the project.
fn select(project: &Project, hostname: Option<&str>) -> Result<Vec<DeviceId>, ProjectError> {
    match hostname {
        Some(hostname) => Ok(vec![project.find_device(hostname)?]),
        None => Ok(project.devices().map(|d| d.id()).collect()),
    }
}

fn hostname(project: &Project, id: DeviceId) -> String {
    project.device(id).map(|d| d.hostname().to_string()).unwrap_or_else(|| id.to_string())
}

#[derive(Parser, Debug)]
#[clap(name = "cfgsmith", author = "Tibor Schneider")]
struct CommandLineArguments {
    /// Main Command
    #[clap(subcommand)]
    cmd: MainCommand,
}

#[derive(Subcommand, Debug)]
enum MainCommand {
    /// Validate the project and generate the configuration scripts
    #[clap(name = "generate")]
    Generate {
        /// Project file (JSON)
        project: PathBuf,
        /// Only generate the device with this hostname
        #[clap(short = 'd', long)]
        device: Option<String>,
        /// Indent nested commands by this many spaces
        #[clap(short = 'i', long, default_value = "0")]
        indent: usize,
        /// Prepend `enable` to the script
        #[clap(short = 'e', long)]
        enable: bool,
        /// Append `write memory` to the script
        #[clap(short = 's', long)]
        save: bool,
        /// Native VLAN policy for trunks (exclude, include or unrestricted)
        #[clap(short = 'n', long)]
        native_vlan_policy: Option<NativeVlanPolicy>,
        /// Write one `<hostname>.cfg` file per device into this directory
        #[clap(short = 'o', long)]
        output: Option<PathBuf>,
    },
    /// Validate the project and print all violations
    #[clap(name = "validate")]
    Validate {
        /// Project file (JSON)
        project: PathBuf,
        /// Only validate the device with this hostname
        #[clap(short = 'd', long)]
        device: Option<String>,
        /// Native VLAN policy for trunks (exclude, include or unrestricted)
        #[clap(short = 'n', long)]
        native_vlan_policy: Option<NativeVlanPolicy>,
    },
    /// List the built-in device models
    #[clap(name = "models")]
    Models,
    /// Load the project and print it in normalized form
    #[clap(name = "export")]
    Export {
        /// Project file (JSON)
        project: PathBuf,
    },
}
