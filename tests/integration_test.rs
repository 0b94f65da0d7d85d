//! Integration tests for netdiagram
//!
//! These tests go from declarations, either through the API or a script file,
//! to the rendered GraphViz text.

use netdiagram::script::Interpreter;
use netdiagram::{render, DefaultStyle, GraphViz, RenderOptions, RenderStats, Topology};
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

fn render_string(topology: &Topology, options: &RenderOptions) -> (String, RenderStats) {
    let mut dot = GraphViz::new(Vec::new());
    let stats = render(topology, &mut dot, &DefaultStyle, options).expect("render failed");
    (String::from_utf8(dot.into_inner()).unwrap(), stats)
}

/// The statement declaring the node `node`, up to its closing `];`.
fn node_statement<'a>(out: &'a str, node: &str) -> &'a str {
    let start = out
        .find(&format!("\"{node}\" ["))
        .unwrap_or_else(|| panic!("no node {node} in:\n{out}"));
    let len = out[start..].find("];").expect("unterminated statement");
    &out[start..start + len]
}

fn load(path: &str) -> (Topology, RenderOptions) {
    let mut interp = Interpreter::new(Vec::new());
    interp.load(path).expect("Failed to load declarations");
    interp.finish()
}

#[test]
fn test_multi_homed_host_routes_through_root() {
    let mut t = Topology::new();
    {
        let mut a = t.with_host("a");
        a.add_nic(ip("10.0.1.1"), Some("a_priv")).unwrap();
        let public = a.add_nic(ip("127.0.0.1"), Some("a_pub")).unwrap();
        a.nic_mut(public)
            .info
            .insert("scope".to_string(), "public".to_string());
    }
    t.declare_subnet("10.0.1.0/24".parse().unwrap(), Some("Private"))
        .unwrap();

    let (out, stats) = render_string(&t, &RenderOptions::default());

    let private = node_statement(&out, "Private");
    assert!(private.contains(">10.0.1.1</TD>"), "{private}");
    assert!(!private.contains("127.0.0.1"));

    let internet = node_statement(&out, "The Internet");
    assert!(internet.contains(">127.0.0.1</TD>"), "{internet}");

    let routed = node_statement(&out, "rtr_The Internet");
    assert!(routed.contains("PORT=\"a\">a</TD>"), "{routed}");
    assert!(out.contains("\"rtr_The Internet\":\"a\" -- \"Private\":\"a_a_priv\""));
    assert!(out.contains("\"rtr_The Internet\":\"a\" -- \"The Internet\":\"a_a_pub\""));

    assert_eq!(stats, RenderStats { hosts_with_no_subnet: 0, empty_subnets: 0 });
}

#[test]
fn test_large_lan_of_solitary_hosts() {
    let mut t = Topology::new();
    t.declare_subnet("10.0.1.0/24".parse().unwrap(), Some("Private"))
        .unwrap();
    for octet in 2..100 {
        let name = format!("h{octet}");
        let mut host = t.with_host(&name);
        host.add_nic(ip(&format!("10.0.1.{octet}")), Some(name.as_str()))
            .unwrap();
    }

    let (out, stats) = render_string(&t, &RenderOptions::default());

    assert!(!out.contains("rtr_"), "{out}");
    let private = node_statement(&out, "Private");
    assert_eq!(private.matches("<TR>").count(), 99);
    assert_eq!(stats, RenderStats { hosts_with_no_subnet: 0, empty_subnets: 0 });
}

#[test]
fn test_example_script() {
    let (t, options) = load("src/tests/test_data/example.ndia");
    assert_eq!(t.host_ids().count(), 6);
    assert_eq!(t.nics().len(), 7);

    let private = t.locate(ip("10.0.1.4")).unwrap();
    assert_eq!(t.net(private).name.as_deref(), Some("Private"));
    assert_eq!(t.net(private).nics().len(), 6);

    let (out, stats) = render_string(&t, &options);
    let table = node_statement(&out, "Private");
    assert!(table.contains("<TD><B>role</B></TD>"), "{table}");
    assert!(table.contains("PORT=\"d_d\""));
    assert!(out.contains("\"rtr_The Internet\":\"a\" -- \"Private\":\"a_a_priv\""));
    assert!(!out.contains("rtr_Private"));
    assert_eq!(stats.empty_subnets, 0);
}

#[test]
fn test_nested_script_with_load() {
    let (t, options) = load("src/tests/test_data/nested.ndia");
    assert!(options.all_hosts);

    let site = t.locate(ip("10.0.3.1")).unwrap();
    assert_eq!(t.net(site).name.as_deref(), Some("Site"));
    assert_eq!(t.net(site).parent(), Some(t.root()));
    let children: Vec<_> = t
        .net(site)
        .children()
        .iter()
        .map(|&c| t.net(c).name.clone().unwrap())
        .collect();
    assert_eq!(children, vec!["Private", "Lab"]);

    let gw = t.host_by_name("lab-gw").unwrap();
    assert_eq!(t.effective_subnet(gw), Some(site));

    let (out, _) = render_string(&t, &options);
    assert!(out.contains("\"rtr_Site\":\"lab-gw\" -- \"Lab\":\"lab-gw_inside\""));
    assert!(out.contains("\"rtr_Site\":\"lab-gw\" -- \"Private\":\"lab-gw_uplink\""));
    // all_hosts puts the solitary LAN hosts in a routed table too
    assert!(node_statement(&out, "rtr_Private").contains("PORT=\"b\">b</TD>"));
}

#[test]
fn test_declaration_order_does_not_matter() {
    let (first, _) = load("src/tests/test_data/example.ndia");

    let mut second = Topology::new();
    second
        .declare_subnet("10.0.1.0/24".parse().unwrap(), Some("Private"))
        .unwrap();
    for (name, octet) in [("f", 6), ("e", 5), ("d", 4), ("c", 3), ("b", 2)] {
        let mut host = second.with_host(name);
        host.host_mut()
            .info
            .insert("role".to_string(), "host".to_string());
        host.add_nic(ip(&format!("10.0.1.{octet}")), Some(name))
            .unwrap();
    }
    {
        let mut a = second.with_host("a");
        let public = a.add_nic(ip("127.0.0.1"), Some("a_pub")).unwrap();
        a.nic_mut(public)
            .info
            .insert("scope".to_string(), "public".to_string());
        a.add_nic(ip("10.0.1.1"), Some("a_priv")).unwrap();
    }
    second.net_mut(second.locate(ip("10.0.1.1")).unwrap())
        .info
        .insert("scope".to_string(), "private".to_string());

    let options = RenderOptions::default();
    assert_eq!(render_string(&first, &options), render_string(&second, &options));
}

#[test]
fn test_render_is_idempotent() {
    let (t, options) = load("src/tests/test_data/nested.ndia");
    let first = render_string(&t, &options);
    let second = render_string(&t, &options);
    assert_eq!(first, second);
}

#[test]
fn test_host_without_nics_is_counted() {
    let mut t = Topology::new();
    t.ensure_host("lonely");
    t.declare_subnet("192.168.0.0/16".parse().unwrap(), None)
        .unwrap();

    let (out, stats) = render_string(&t, &RenderOptions::default());
    assert!(!out.contains("lonely"));
    assert_eq!(stats, RenderStats { hosts_with_no_subnet: 1, empty_subnets: 2 });
}

#[test]
fn test_snapshot_json() {
    let (t, _) = load("src/tests/test_data/example.ndia");
    let json = serde_json::to_value(t.snapshot()).unwrap();

    assert_eq!(json["prefix"], "0.0.0.0/0");
    assert_eq!(json["children"][0]["name"], "Private");
    assert_eq!(json["children"][0]["info"]["scope"], "private");
    assert_eq!(json["children"][0]["nics"][0]["address"], "10.0.1.1");
    assert_eq!(json["children"][0]["nics"][0]["host"], "a");
}
