use super::*;

#[test]
fn test_to_internal_literal_cases() {
    let cases = [
        ("Simple path", "/interfaces/interface", ".interfaces.interface"),
        ("Path with hyphens", "/system-config/hostname", ".system_config.hostname"),
        (
            "Path with list node",
            "/interfaces/interface[name=eth0]",
            ".interfaces.interface{.name==\"eth0\"}",
        ),
        (
            "Complex path",
            "/network-instances/network-instance[name=default]/protocols/protocol[name=BGP]/bgp",
            ".network_instances.network_instance{.name==\"default\"}.protocols.protocol{.name==\"BGP\"}.bgp",
        ),
        ("Empty input", "", ""),
        (
            "Input with multiple list nodes",
            "/a/b[x=1]/c[y=2]/d[z=3]",
            ".a.b{.x==\"1\"}.c{.y==\"2\"}.d{.z==\"3\"}",
        ),
    ];

    for (name, input, expected) in cases {
        assert_eq!(to_internal(input), expected, "case: {name}");
    }
}

#[test]
fn test_to_internal_leaves_key_value_untouched() {
    assert_eq!(
        to_internal("/a/b[x=ethernet-1/1]"),
        ".a.b{.x==\"ethernet-1/1\"}"
    );
    assert_eq!(
        to_internal("/greeter/list-node[if-name=mgmt0.0]/leaf-a"),
        ".greeter.list_node{.if-name==\"mgmt0.0\"}.leaf_a"
    );
}

#[test]
fn test_to_internal_adjacent_predicates() {
    assert_eq!(
        to_internal("/a/b[x=1][y=lag-1/2]"),
        ".a.b{.x==\"1\"}{.y==\"lag-1/2\"}"
    );
}

#[test]
fn test_to_external_literal_cases() {
    assert_eq!(to_external(""), "");
    assert_eq!(to_external(".interfaces.interface"), "/interfaces/interface");
    assert_eq!(to_external(".system_config.hostname"), "/system-config/hostname");
    assert_eq!(
        to_external(".interfaces.interface{.name==\"eth0\"}"),
        "/interfaces/interface[name=eth0]"
    );
    assert_eq!(
        to_external(".a.b{.x==\"1\"}.c{.y==\"2\"}.d{.z==\"3\"}"),
        "/a/b[x=1]/c[y=2]/d[z=3]"
    );
}

#[test]
fn test_to_external_keeps_final_character() {
    assert_eq!(to_external(".greeter.name"), "/greeter/name");
    assert_eq!(to_external(".a"), "/a");
    assert_eq!(to_external("."), "/");
    assert_eq!(to_external(".a.b_"), "/a/b-");
}

#[test]
fn test_to_external_leaves_key_value_untouched() {
    assert_eq!(
        to_external(".interface{.name==\"ethernet-1/1\"}.subinterface{.index==\"0\"}"),
        "/interface[name=ethernet-1/1]/subinterface[index=0]"
    );
    assert_eq!(
        to_external(".srl_nokia_net_inst.network_instance{.name==\"ip.vrf_red\"}"),
        "/srl-nokia-net-inst/network-instance[name=ip.vrf_red]"
    );
}

#[test]
fn test_to_external_unquoted_value() {
    assert_eq!(to_external(".a.b{.x==1}.c"), "/a/b[x=1]/c");
}

#[test]
fn test_round_trip() {
    let paths = [
        "/greeter",
        "/greeter/name",
        "/network-instance[name=default]/protocols/bgp",
        "/interface[name=ethernet-1/1]/subinterface[index=0]/ipv4",
        "/a/b[x=1]/c[y=2]/d[z=3]",
        "/a/b[x=1][y=2]",
        "/acl/ipv4-filter[name=my.filter-1]/entry[sequence-id=10]",
    ];

    for p in paths {
        assert_eq!(to_external(&to_internal(p)), p, "round trip of {p}");
    }
}

#[test]
fn test_parse_elems() {
    let elems = parse_elems("/network-instance[name=default]/protocols/bgp");
    assert_eq!(elems.len(), 3);
    assert_eq!(elems[0].name, "network-instance");
    assert_eq!(elems[0].keys.get("name").map(String::as_str), Some("default"));
    assert_eq!(elems[1].name, "protocols");
    assert!(elems[1].keys.is_empty());
    assert_eq!(elems[2].name, "bgp");
}

#[test]
fn test_parse_elems_with_slash_in_key_and_multiple_keys() {
    let elems = parse_elems("/interface[name=ethernet-1/1]/neighbor[ip=10.0.0.1][vrf=red]");
    assert_eq!(elems.len(), 2);
    assert_eq!(
        elems[0].keys.get("name").map(String::as_str),
        Some("ethernet-1/1")
    );
    assert_eq!(elems[1].keys.len(), 2);
    assert_eq!(elems[1].keys.get("vrf").map(String::as_str), Some("red"));
}

#[test]
fn test_parse_elems_empty_and_root() {
    assert!(parse_elems("").is_empty());
    assert!(parse_elems("/").is_empty());
}

#[test]
fn test_is_descendant_or_self() {
    assert!(is_descendant_or_self("/greeter", "/greeter"));
    assert!(is_descendant_or_self("/greeter/name", "/greeter"));
    assert!(is_descendant_or_self("/greeter[id=1]", "/greeter"));
    assert!(!is_descendant_or_self("/greeter2", "/greeter"));
    assert!(!is_descendant_or_self("/other", "/greeter"));
}
