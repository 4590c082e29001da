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


use crate::catalog;
use crate::color::Color;
use crate::project::{Project, ProjectError};
use crate::template::{AccessPortTemplate, PortTemplate, TrunkPortTemplate};
use crate::types::{DeviceClass, DeviceId, InterfaceId, RegistryError};
use crate::validate::Constraint;

fn iface(s: &str) -> InterfaceId {
    s.parse().unwrap()
}

fn access(vlan: u16) -> PortTemplate {
    let mut t = AccessPortTemplate::new();
    t.set_access_vlan(vlan).unwrap();
    t.into()
}

/// Project with a single access switch defining VLAN 10 and 20
fn setup() -> (Project, DeviceId) {
    let mut project = Project::new();
    let id = project.add_device(catalog::access_24(), DeviceClass::SwitchL2).unwrap();
    project
        .modify_device(id, |d| {
            d.set_hostname("sw-01")?;
            d.define_vlan(10, Some("USERS"))?;
            d.define_vlan(20, Some("GUESTS"))?;
            Ok(())
        })
        .unwrap();
    (project, id)
}

#[test]
fn test_add_and_apply() {
    let (mut project, id) = setup();
    let name = project.add_template(access(10), None);
    assert_eq!(name, "VLAN 10");
    project.assign(id, iface("Fa0/1"), &name).unwrap();
    assert!(project.output(id).is_none());

    let script = project.apply(id).unwrap().clone();
    assert_eq!(
        script.into_commands(),
        vec![
            "configure terminal",
            "hostname sw-01",
            "vlan 10",
            "name USERS",
            "exit",
            "vlan 20",
            "name GUESTS",
            "exit",
            "interface FastEthernet0/1",
            "switchport mode access",
            "switchport access vlan 10",
            "exit",
            "end",
        ]
    );
    assert!(project.output(id).is_some());
    assert!(project.validate(id).unwrap().is_empty());
}

#[test]
fn test_device_ids() {
    let mut project = Project::new();
    let a = project.add_device(catalog::access_24(), DeviceClass::SwitchL2).unwrap();
    let b = project.add_device(catalog::branch_router(), DeviceClass::Router).unwrap();
    assert_ne!(a, b);
    assert!(project.registry().is_registered(a));
    assert!(!project.registry().is_registered(b));
    assert_eq!(project.devices().count(), 2);

    // a layer-2 only model cannot host a layer-3 switch
    let err = project.add_device(catalog::access_24(), DeviceClass::SwitchL3).unwrap_err();
    assert!(matches!(err, ProjectError::Construction(_)));
    assert_eq!(project.devices().count(), 2);
}

#[test]
fn test_unique_template_names() {
    let mut project = Project::new();
    assert_eq!(project.add_template(access(10), None), "VLAN 10");
    assert_eq!(project.add_template(access(10), None), "VLAN 10 (2)");
    assert_eq!(project.add_template(access(10), None), "VLAN 10 (3)");
    assert_eq!(project.add_template(AccessPortTemplate::new().into(), None), "Custom template");
    assert_eq!(project.add_template(TrunkPortTemplate::new().into(), None), "TRUNK");
    assert_eq!(project.templates().count(), 5);

    let red = Color::new(255, 0, 0);
    assert_eq!(
        project.insert_template("VLAN 10", access(20), red),
        Err(ProjectError::DuplicateTemplate("VLAN 10".to_string()))
    );
    project.insert_template("Printers", access(20), red).unwrap();
    assert_eq!(project.template("Printers").unwrap().color(), red);
}

#[test]
fn test_update_template() {
    let (mut project, id) = setup();
    let name = project.add_template(access(10), None);
    project.assign(id, iface("Fa0/1"), &name).unwrap();
    project.assign(id, iface("Fa0/2"), &name).unwrap();

    let count = project
        .update_template(&name, |t| {
            if let PortTemplate::Access(t) = t {
                t.set_access_vlan(20)?;
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(count, 2);
    let bound = project.registry().lookup(id, &iface("Fa0/2")).unwrap().unwrap();
    assert_eq!(bound, &access(20));

    // a rejected change leaves the library and the bindings untouched
    let err = project
        .update_template(&name, |t| {
            if let PortTemplate::Access(t) = t {
                t.set_access_vlan(0)?;
            }
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ProjectError::Construction(_)));
    assert_eq!(project.template(&name).unwrap().template(), &access(20));
    let bound = project.registry().lookup(id, &iface("Fa0/1")).unwrap().unwrap();
    assert_eq!(bound, &access(20));

    assert_eq!(
        project.update_template("missing", |_| Ok(())),
        Err(ProjectError::UnknownTemplate("missing".to_string()))
    );
}

#[test]
fn test_rename_and_recolor() {
    let (mut project, id) = setup();
    let users = project.add_template(access(10), None);
    let guests = project.add_template(access(20), None);
    project.assign(id, iface("Fa0/1"), &users).unwrap();

    assert_eq!(
        project.rename_template(&users, &guests),
        Err(ProjectError::DuplicateTemplate(guests.clone()))
    );
    project.rename_template(&users, "Users").unwrap();
    assert!(project.template(&users).is_none());
    let binding = project.registry().binding(id, &iface("Fa0/1")).unwrap().unwrap();
    assert_eq!(binding.tag().name, "Users");

    let blue = Color::new(0, 0, 255);
    project.set_template_color("Users", blue).unwrap();
    let binding = project.registry().binding(id, &iface("Fa0/1")).unwrap().unwrap();
    assert_eq!(binding.tag().color, blue);
    assert_eq!(project.template("Users").unwrap().color(), blue);
}

#[test]
fn test_remove_template() {
    let (mut project, id) = setup();
    let name = project.add_template(access(10), None);
    project.assign(id, iface("Fa0/1"), &name).unwrap();
    project.assign(id, iface("Gi0/1"), &name).unwrap();

    assert_eq!(project.remove_template(&name).unwrap(), access(10));
    assert_eq!(project.registry().lookup(id, &iface("Fa0/1")), Ok(None));
    assert_eq!(project.registry().lookup(id, &iface("Gi0/1")), Ok(None));
    assert_eq!(
        project.assign(id, iface("Fa0/1"), &name),
        Err(ProjectError::UnknownTemplate(name.clone()))
    );
}

#[test]
fn test_assign_errors() {
    let (mut project, id) = setup();
    let name = project.add_template(access(10), None);
    assert_eq!(
        project.assign(DeviceId(42), iface("Fa0/1"), &name),
        Err(ProjectError::UnknownDevice(DeviceId(42)))
    );
    let err = project.assign(id, iface("Fa0/25"), &name).unwrap_err();
    assert!(matches!(err, ProjectError::Registry(RegistryError::UnknownInterface(_))));

    project.assign(id, iface("Fa0/3"), &name).unwrap();
    project.unassign(id, &iface("Fa0/3")).unwrap();
    assert_eq!(project.registry().lookup(id, &iface("Fa0/3")), Ok(None));
}

#[test]
fn test_assign_to_router() {
    let (mut project, _) = setup();
    let name = project.add_template(access(10), None);
    let router = project.add_device(catalog::branch_router(), DeviceClass::Router).unwrap();
    assert_eq!(
        project.assign(router, iface("Gi0/0/1"), &name),
        Err(ProjectError::Registry(RegistryError::NoSwitchports(router)))
    );
}

#[test]
fn test_modify_device_atomic() {
    let (mut project, id) = setup();
    let before = project.device(id).unwrap().clone();
    let err = project
        .modify_device(id, |d| {
            d.set_hostname("sw-02")?;
            d.define_vlan(30, None)?;
            d.define_vlan(5000, None)?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, ProjectError::Construction(_)));
    assert_eq!(project.device(id), Some(&before));
    assert_eq!(project.find_device("sw-01"), Ok(id));

    project.modify_device(id, |d| d.set_hostname("sw-02").map(|_| ())).unwrap();
    assert_eq!(project.find_device("sw-02"), Ok(id));
}

#[test]
fn test_apply_rejected() {
    let (mut project, id) = setup();
    let users = project.add_template(access(10), None);
    project.assign(id, iface("Fa0/1"), &users).unwrap();
    let first = project.apply(id).unwrap().clone();

    let unknown = project.add_template(access(30), None);
    project.assign(id, iface("Fa0/2"), &unknown).unwrap();
    let violations = project.validate(id).unwrap();
    assert!(violations.has(Constraint::UndefinedVlan));
    match project.apply(id) {
        Err(ProjectError::Rejected(e)) => assert_eq!(e.violations, violations),
        other => panic!("unexpected result: {:?}", other),
    }
    // the last successful output is kept
    assert_eq!(project.output(id), Some(&first));

    project.modify_device(id, |d| d.define_vlan(30, None).map(|_| ())).unwrap();
    let second = project.apply(id).unwrap();
    assert!(second.contains("switchport access vlan 30"));
}

#[test]
fn test_remove_device() {
    let (mut project, id) = setup();
    let name = project.add_template(access(10), None);
    project.assign(id, iface("Fa0/1"), &name).unwrap();
    project.apply(id).unwrap();

    assert_eq!(project.find_device("sw-01"), Ok(id));
    let device = project.remove_device(id).unwrap();
    assert_eq!(device.hostname().as_str(), "sw-01");
    assert!(project.output(id).is_none());
    assert!(!project.registry().is_registered(id));
    assert_eq!(
        project.find_device("sw-01"),
        Err(ProjectError::UnknownHostname("sw-01".to_string()))
    );
    assert_eq!(project.remove_device(id).unwrap_err(), ProjectError::UnknownDevice(id));
    // the template library is shared and outlives the device
    assert!(project.template(&name).is_some());

    let next = project.add_device(catalog::access_24(), DeviceClass::SwitchL2).unwrap();
    assert_ne!(next, id);
}
