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


//! End-to-end scenarios using the public API only

use cfgsmith::registry::{DisplayTag, InterfaceRegistry};
use cfgsmith::template::{
    AccessPortTemplate, DeviceTemplate, PortSettings, PortTemplate, Svi, TrunkPortTemplate,
};
use cfgsmith::validate::{Constraint, NativeVlanPolicy, ValidationOptions};
use cfgsmith::values::ViolationAction;
use cfgsmith::{catalog, generate, validate, ConstructionError, DeviceClass, DeviceId, Project};

fn tag(name: &str) -> DisplayTag {
    DisplayTag::new(name, Default::default())
}

fn users_port() -> PortTemplate {
    let mut t = AccessPortTemplate::new();
    t.set_access_vlan(10)
        .unwrap()
        .set_portfast(true)
        .set_violation_action(ViolationAction::Shutdown)
        .set_max_mac_count(1)
        .unwrap();
    t.into()
}

fn access_switch() -> (DeviceTemplate, InterfaceRegistry) {
    let mut switch = DeviceTemplate::switch_l2(DeviceId(0), catalog::access_24()).unwrap();
    switch.set_hostname("ACC-01").unwrap();
    switch.define_vlan(10, Some("USERS")).unwrap();
    switch.define_vlan(20, Some("VOICE")).unwrap();
    switch.define_vlan(30, None).unwrap();
    let mut registry = InterfaceRegistry::new();
    registry.register(&switch).unwrap();
    (switch, registry)
}

#[test]
fn secured_access_port() {
    let block = users_port().generate_config(&"Fa0/1".parse().unwrap());
    assert_eq!(
        block.into_commands(),
        vec![
            "interface FastEthernet0/1",
            "switchport mode access",
            "switchport access vlan 10",
            "switchport port-security",
            "switchport port-security maximum 1",
            "switchport port-security violation shutdown",
            "spanning-tree portfast",
            "exit",
        ]
    );
}

#[test]
fn native_vlan_in_allowed_set() {
    let (switch, mut registry) = access_switch();
    let mut uplink = TrunkPortTemplate::new();
    uplink.set_allowed_vlans(vec![10, 20, 30]).unwrap().set_native_vlan(10).unwrap();
    registry.assign(switch.id(), "Gi0/1".parse().unwrap(), uplink.into(), tag("uplink")).unwrap();

    let options = ValidationOptions::default();
    let violations = validate(&switch, &registry, &options);
    assert_eq!(violations.len(), 1);
    let violation = violations.iter().next().unwrap();
    assert_eq!(violation.constraint, Constraint::NativeVlanPolicy);
    assert_eq!(violation.field, "GigabitEthernet0/1.native_vlan");
    assert!(generate(&switch, &registry, &options).is_err());

    // the same graph is fine if the native VLAN must be allowed
    let options = ValidationOptions { native_vlan_policy: NativeVlanPolicy::Include };
    assert!(validate(&switch, &registry, &options).is_empty());
    let script = generate(&switch, &registry, &options).unwrap();
    assert!(script.contains("switchport trunk native vlan 10"));
    assert!(script.contains("switchport trunk allowed vlan 10,20,30"));
}

#[test]
fn svi_for_undefined_vlan() {
    let mut switch = DeviceTemplate::switch_l3(DeviceId(0), catalog::l3_poe_24()).unwrap();
    switch.define_vlan(10, None).unwrap();
    switch.set_svi(99, Svi::with_address("10.0.99.1/24".parse().unwrap())).unwrap();
    let mut registry = InterfaceRegistry::new();
    registry.register(&switch).unwrap();

    let options = ValidationOptions::default();
    let violations = validate(&switch, &registry, &options);
    assert!(violations.has(Constraint::UndefinedVlan));
    let err = generate(&switch, &registry, &options).unwrap_err();
    assert_eq!(err.violations, violations);

    switch.define_vlan(99, Some("MGMT")).unwrap();
    let script = generate(&switch, &registry, &options).unwrap();
    assert!(script.position("vlan 99") < script.position("interface Vlan99"));
}

#[test]
fn inert_and_deterministic() {
    let (switch, mut registry) = access_switch();
    registry.assign(switch.id(), "Fa0/7".parse().unwrap(), users_port(), tag("users")).unwrap();
    registry
        .assign(switch.id(), "Fa0/8".parse().unwrap(), AccessPortTemplate::new().into(), tag("x"))
        .unwrap();

    let options = ValidationOptions::default();
    let first = generate(&switch, &registry, &options).unwrap();
    let second = generate(&switch, &registry, &options).unwrap();
    assert_eq!(first, second);

    // an inert template only emits the mode
    let start = first.position("interface FastEthernet0/8").unwrap();
    let block: Vec<&str> = first.lines().skip(start).take(3).collect();
    assert_eq!(block, vec!["interface FastEthernet0/8", "switchport mode access", "exit"]);

    // every VLAN is defined before it is referenced
    let definition = first.position("vlan 10").unwrap();
    let reference = first.position("switchport access vlan 10").unwrap();
    assert!(definition < reference);
}

#[test]
fn layer2_switch_rejects_routing() {
    let (mut switch, _) = access_switch();
    let before = switch.clone();
    let err = switch.set_svi(10, Svi::new()).unwrap_err();
    assert!(matches!(err, ConstructionError::UnsupportedByDevice { .. }));
    assert_eq!(switch, before);
    assert!(!switch.supports_routing());
    assert!(switch.supports_switching());
}

#[test]
fn project_reassignment() {
    let mut project = Project::new();
    let id = project.add_device(catalog::access_24(), DeviceClass::SwitchL2).unwrap();
    project
        .modify_device(id, |d| {
            d.define_vlan(10, None)?.define_vlan(20, None)?;
            Ok(())
        })
        .unwrap();
    let users = project.add_template(users_port(), None);
    let mut guests = AccessPortTemplate::new();
    guests.set_access_vlan(20).unwrap();
    let guests = project.add_template(guests.into(), None);

    let port = "Fa0/5".parse().unwrap();
    project.assign(id, port, &users).unwrap();
    project.assign(id, "Fa0/5".parse().unwrap(), &guests).unwrap();

    let script = project.apply(id).unwrap();
    assert!(script.contains("switchport access vlan 20"));
    assert!(!script.contains("switchport access vlan 10"));
    assert!(!script.contains("switchport port-security"));
}
