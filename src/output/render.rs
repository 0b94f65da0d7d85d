//! Recursive rendering of a [`Topology`] into nested clusters.
//!
//! Each net becomes a cluster holding its subnets, an "attached" table of the
//! hosts with NICs directly in it, and a "routed" table of the multi-homed hosts
//! whose NICs all meet at this net, with one edge per NIC of those hosts.

use super::graphviz::{attr_list, html_escape, quote, styled};
use super::{Sink, StylePolicy};
use crate::config::parse_flag;
use crate::error::Result;
use crate::models::{Attributes, Host, HostId, NetId, NicId};
use crate::topology::Topology;
use itertools::Itertools;

/// Options controlling which hosts are rendered where.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// List every host in its effective subnet's routed table, not only the
    /// non-solitary ones.
    pub all_hosts: bool,
    /// Options the renderer does not know about, kept as given.
    pub extra: Attributes,
}

impl RenderOptions {
    pub fn set(&mut self, key: &str, value: &str) {
        match key {
            "all_hosts" => self.all_hosts = parse_flag(value),
            _ => {
                log::warn!("Unknown render option '{key}' = '{value}'");
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn apply(&mut self, options: &Attributes) {
        for (key, value) in options {
            self.set(key, value);
        }
    }
}

/// Diagnostics collected during a render pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderStats {
    /// Hosts without any NIC, which therefore appear nowhere.
    pub hosts_with_no_subnet: usize,
    /// Nets with no host in them or anywhere below them.
    pub empty_subnets: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Attached,
    Routed,
}

/// Render `topology` into `sink`.
///
/// Rendering only reads the topology; all per-pass state is rebuilt on every
/// call, so rendering the same topology twice yields the same output.
pub fn render<S, P>(
    topology: &Topology,
    sink: &mut S,
    style: &P,
    options: &RenderOptions,
) -> Result<RenderStats>
where
    S: Sink,
    P: StylePolicy + ?Sized,
{
    let renderer = Renderer {
        topology,
        sink,
        style,
        options,
        hosts: vec![Vec::new(); topology.nets().len()],
        node_ids: vec![None; topology.nets().len()],
        stats: RenderStats::default(),
    };
    renderer.run()
}

struct Renderer<'a, S, P: ?Sized> {
    topology: &'a Topology,
    sink: &'a mut S,
    style: &'a P,
    options: &'a RenderOptions,
    /// Hosts whose effective subnet is each net, sorted by name.
    hosts: Vec<Vec<HostId>>,
    /// Node identifier of each net rendered so far in this pass.
    node_ids: Vec<Option<String>>,
    stats: RenderStats,
}

impl<S, P> Renderer<'_, S, P>
where
    S: Sink,
    P: StylePolicy + ?Sized,
{
    fn run(mut self) -> Result<RenderStats> {
        self.assign_hosts();

        self.scoped("graph ndia", |r| {
            let graph_style = r.style.graph();
            if !graph_style.is_empty() {
                r.sink.write_statement(&attr_list(&graph_style))?;
            }
            r.render_net(r.topology.root())
        })?;

        log::info!(
            "Rendered {} nets, {} hosts ({} without subnet, {} empty nets)",
            self.topology.nets().len(),
            self.topology.host_ids().count(),
            self.stats.hosts_with_no_subnet,
            self.stats.empty_subnets
        );
        Ok(self.stats)
    }

    fn assign_hosts(&mut self) {
        let topology = self.topology;
        for host in topology.host_ids() {
            match topology.effective_subnet(host) {
                Some(net) => self.hosts[net.index()].push(host),
                None => {
                    log::warn!("Host '{}' has no NICs, leaving it out", topology.host(host).name);
                    self.stats.hosts_with_no_subnet += 1;
                }
            }
        }
        for hosts in &mut self.hosts {
            hosts.sort_by(|&a, &b| topology.host(a).name.cmp(&topology.host(b).name));
        }
    }

    /// Render `id` and its subtree; returns whether any host showed up in it.
    fn render_net(&mut self, id: NetId) -> Result<bool> {
        let node = self.topology.net(id).display_id();
        self.node_ids[id.index()] = Some(node.clone());

        let group = format!("subgraph {}", quote(&format!("cluster_{node}")));
        self.scoped(&group, |r| r.render_cluster(id, &node))
    }

    /// Open `label`, run `body`, and close `label` whether or not `body` failed.
    fn scoped<T, F>(&mut self, label: &str, body: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.sink.open_group(label)?;
        let result = body(self);
        let closed = self.sink.close_group(label);
        let value = result?;
        closed?;
        Ok(value)
    }

    fn render_cluster(&mut self, id: NetId, node: &str) -> Result<bool> {
        let topology = self.topology;
        let net = topology.net(id);

        let mut label = self.style.cluster(net);
        let text = match &net.name {
            Some(name) => format!("{name}\\n{}", net.prefix),
            None => net.prefix.to_string(),
        };
        label.insert("label".to_string(), text);
        self.sink.write_statement(&attr_list(&label))?;

        let mut populated = false;
        for &child in net.children() {
            populated |= self.render_net(child)?;
        }

        let attached = self.attached_hosts(id);
        let effective = &self.hosts[id.index()];
        let routed: Vec<HostId> = effective
            .iter()
            .copied()
            .filter(|&host| self.options.all_hosts || !topology.is_solitary(host))
            .collect();

        populated |= !attached.is_empty() || !effective.is_empty();
        if !populated {
            log::debug!("Net {net} has no hosts");
            self.stats.empty_subnets += 1;
        }

        self.render_table(id, node, &attached, Table::Attached)?;
        self.render_table(id, &format!("rtr_{node}"), &routed, Table::Routed)?;
        Ok(populated)
    }

    /// Hosts owning a NIC directly in `id`, each once, by name.
    fn attached_hosts(&self, id: NetId) -> Vec<HostId> {
        let topology = self.topology;
        topology
            .net(id)
            .nics()
            .iter()
            .filter_map(|&nic| topology.nic(nic).host())
            .unique()
            .sorted_by(|&a, &b| topology.host(a).name.cmp(&topology.host(b).name))
            .collect()
    }

    /// The host's NICs that belong in a table of `id`.
    fn relevant_nics(&self, id: NetId, host: HostId, table: Table) -> Vec<NicId> {
        let topology = self.topology;
        let prefix = topology.net(id).prefix;
        topology
            .host(host)
            .nics()
            .iter()
            .copied()
            .filter(|&nic| match table {
                Table::Attached => topology.nic(nic).net() == id,
                Table::Routed => prefix.contains(topology.nic(nic).address),
            })
            .collect()
    }

    fn render_table(&mut self, id: NetId, node: &str, hosts: &[HostId], table: Table) -> Result<()> {
        if hosts.is_empty() {
            return Ok(());
        }
        let topology = self.topology;

        let host_keys: Vec<&String> = hosts
            .iter()
            .flat_map(|&h| topology.host(h).info.keys())
            .sorted()
            .dedup()
            .collect();
        let nic_keys: Vec<&String> = hosts
            .iter()
            .flat_map(|&h| topology.host(h).nics())
            .flat_map(|&n| topology.nic(n).info.keys())
            .sorted()
            .dedup()
            .collect();

        let mut html = String::from("<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n<TR>");
        let headers = std::iter::once("Host")
            .chain(host_keys.iter().map(|k| k.as_str()))
            .chain(["NIC", "Address"])
            .chain(nic_keys.iter().map(|k| k.as_str()));
        for header in headers {
            html.push_str(&format!("<TD><B>{}</B></TD>", html_escape(header)));
        }
        html.push_str("</TR>\n");

        for &host_id in hosts {
            let host = topology.host(host_id);
            let nics = self.relevant_nics(id, host_id, table);
            let rowspan = if nics.len() > 1 {
                format!(" ROWSPAN=\"{}\"", nics.len())
            } else {
                String::new()
            };

            for (i, &nic_id) in nics.iter().enumerate() {
                let nic = topology.nic(nic_id);
                html.push_str("<TR>");
                if i == 0 {
                    html.push_str(&format!(
                        "<TD{rowspan} PORT=\"{port}\">{name}</TD>",
                        port = html_escape(&host.name),
                        name = html_escape(&host.name)
                    ));
                    for key in &host_keys {
                        let value = host.info.get(*key).map(String::as_str).unwrap_or("");
                        html.push_str(&format!("<TD{rowspan}>{}</TD>", html_escape(value)));
                    }
                }

                // the port goes on the last cell of the row
                let port = format!(" PORT=\"{}\"", html_escape(&topology.nic_port(nic_id)));
                let address_port = if nic_keys.is_empty() { port.as_str() } else { "" };
                html.push_str(&format!(
                    "<TD>{name}</TD><TD{address_port}>{address}</TD>",
                    name = html_escape(nic.name.as_deref().unwrap_or("")),
                    address = nic.address
                ));
                for (k, key) in nic_keys.iter().enumerate() {
                    let cell_port = if k + 1 == nic_keys.len() { port.as_str() } else { "" };
                    let value = nic.info.get(*key).map(String::as_str).unwrap_or("");
                    html.push_str(&format!("<TD{cell_port}>{}</TD>", html_escape(value)));
                }
                html.push_str("</TR>\n");
            }
        }
        html.push_str("</TABLE>");

        let host_refs: Vec<&Host> = hosts.iter().map(|&h| topology.host(h)).collect();
        let mut style = match table {
            Table::Attached => self.style.attached(&host_refs),
            Table::Routed => self.style.routed(&host_refs),
        };
        style.insert("label".to_string(), format!("<{html}>"));
        style.insert("shape".to_string(), "none".to_string());
        self.sink.write_statement(&styled(&quote(node), &style))?;

        if table == Table::Routed {
            self.connect(node, hosts)?;
        }
        Ok(())
    }

    /// One edge from each routed host cell to the table holding each of its NICs.
    fn connect(&mut self, node: &str, hosts: &[HostId]) -> Result<()> {
        let topology = self.topology;
        for &host_id in hosts {
            let host = topology.host(host_id);
            for &nic_id in host.nics() {
                let nic = topology.nic(nic_id);
                let Some(nic_node) = &self.node_ids[nic.net().index()] else {
                    log::debug!("Skipping edge to {}: its net is not rendered yet", nic.address);
                    continue;
                };
                let edge = format!(
                    "{}:{} -- {}:{}",
                    quote(node),
                    quote(&host.name),
                    quote(nic_node),
                    quote(&topology.nic_port(nic_id))
                );
                let statement = styled(&edge, &self.style.connection(host, nic));
                self.sink.write_statement(&statement)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Prefix;
    use crate::output::{DefaultStyle, GraphViz, PlainStyle};
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn p(s: &str) -> Prefix {
        s.parse().unwrap()
    }

    fn render_string(t: &Topology, options: &RenderOptions) -> (String, RenderStats) {
        let mut gv = GraphViz::new(Vec::new());
        let stats = render(t, &mut gv, &DefaultStyle, options).unwrap();
        (String::from_utf8(gv.into_inner()).unwrap(), stats)
    }

    /// Host "x" on two sibling subnets, host "s" only on one.
    fn two_subnets() -> Topology {
        let mut t = Topology::new();
        t.declare_subnet(p("10.0.1.0/24"), Some("X")).unwrap();
        t.declare_subnet(p("10.0.2.0/24"), Some("Y")).unwrap();
        t.declare_subnet(p("10.0.0.0/16"), Some("Site")).unwrap();
        {
            let mut scope = t.with_host("x");
            scope.add_nic(ip("10.0.1.1"), Some("x1")).unwrap();
            scope.add_nic(ip("10.0.2.1"), Some("x2")).unwrap();
        }
        {
            let mut scope = t.with_host("s");
            scope.add_nic(ip("10.0.1.9"), Some("s1")).unwrap();
        }
        t
    }

    #[test]
    fn test_empty_topology() {
        let t = Topology::new();
        let (out, stats) = render_string(&t, &RenderOptions::default());
        assert_eq!(
            out,
            "graph ndia {\n\
             \tcompound=\"true\" newrank=\"true\";\n\
             \tsubgraph \"cluster_The Internet\" {\n\
             \t\tlabel=\"The Internet\\n0.0.0.0/0\";\n\
             \t} // subgraph \"cluster_The Internet\"\n\
             } // graph ndia\n"
        );
        assert_eq!(stats, RenderStats { hosts_with_no_subnet: 0, empty_subnets: 1 });
    }

    #[test]
    fn test_routed_table_for_non_solitary_host() {
        let t = two_subnets();
        let (out, stats) = render_string(&t, &RenderOptions::default());

        assert!(out.contains("\"rtr_Site\" [color=\"#0a0\" label=<"), "{out}");
        assert!(out.contains("\"rtr_Site\":\"x\" -- \"X\":\"x_x1\" [color=\"#0a0\"];"));
        assert!(out.contains("\"rtr_Site\":\"x\" -- \"Y\":\"x_x2\" [color=\"#0a0\"];"));
        assert!(!out.contains("\"rtr_X\""));
        assert!(!out.contains("\"rtr_Site\":\"s\""));
        // solitary host only in its attached table
        assert!(out.contains("PORT=\"s\">s</TD>"));
        assert_eq!(out.matches("PORT=\"s\"").count(), 1);
        assert_eq!(stats, RenderStats { hosts_with_no_subnet: 0, empty_subnets: 0 });
    }

    #[test]
    fn test_all_hosts_option() {
        let t = two_subnets();
        let options = RenderOptions { all_hosts: true, ..Default::default() };
        let (out, _) = render_string(&t, &options);

        assert!(out.contains("\"rtr_X\" [color=\"#0a0\""));
        assert!(out.contains("\"rtr_X\":\"s\" -- \"X\":\"s_s1\""));
        assert!(out.contains("\"rtr_Site\":\"x\" -- \"X\":\"x_x1\""));
    }

    #[test]
    fn test_nested_cluster_order() {
        let t = two_subnets();
        let (out, _) = render_string(&t, &RenderOptions::default());

        let pos = |needle: &str| out.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
        assert!(pos("cluster_The Internet") < pos("cluster_Site"));
        assert!(pos("cluster_Site") < pos("cluster_X"));
        assert!(pos("cluster_X") < pos("cluster_Y"));
        // subtree is closed before the parent's tables
        assert!(pos("} // subgraph \"cluster_Y\"") < pos("\"rtr_Site\" ["));
        assert!(pos("\"rtr_Site\" [") < pos("} // subgraph \"cluster_Site\""));
    }

    #[test]
    fn test_table_columns_and_rowspan() {
        let mut t = Topology::new();
        {
            let mut scope = t.with_host("b");
            scope.host_mut().info.insert("role".into(), "db".into());
            let nic = scope.add_nic(ip("10.0.0.2"), Some("eth0")).unwrap();
            scope.nic_mut(nic).info.insert("vlan".into(), "7".into());
            scope.add_nic(ip("10.0.0.3"), Some("eth1")).unwrap();
        }
        {
            let mut scope = t.with_host("a");
            scope.host_mut().info.insert("os".into(), "linux".into());
            scope.add_nic(ip("10.0.0.1"), None).unwrap();
        }

        let (out, _) = render_string(&t, &RenderOptions::default());
        let expected = "\"The Internet\" [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">\n\
            <TR><TD><B>Host</B></TD><TD><B>os</B></TD><TD><B>role</B></TD><TD><B>NIC</B></TD><TD><B>Address</B></TD><TD><B>vlan</B></TD></TR>\n\
            <TR><TD PORT=\"a\">a</TD><TD>linux</TD><TD></TD><TD></TD><TD>10.0.0.1</TD><TD PORT=\"nic2\"></TD></TR>\n\
            <TR><TD ROWSPAN=\"2\" PORT=\"b\">b</TD><TD ROWSPAN=\"2\"></TD><TD ROWSPAN=\"2\">db</TD><TD>eth0</TD><TD>10.0.0.2</TD><TD PORT=\"b_eth0\">7</TD></TR>\n\
            <TR><TD>eth1</TD><TD>10.0.0.3</TD><TD PORT=\"b_eth1\"></TD></TR>\n\
            </TABLE>> shape=\"none\"];";
        assert!(out.contains(expected), "{out}");
    }

    #[test]
    fn test_attached_table_lists_host_once() {
        let mut t = Topology::new();
        {
            let mut scope = t.with_host("multi");
            scope.add_nic(ip("10.0.0.1"), Some("a")).unwrap();
            scope.add_nic(ip("10.0.0.2"), Some("b")).unwrap();
        }
        let (out, _) = render_string(&t, &RenderOptions::default());
        assert_eq!(out.matches("PORT=\"multi\"").count(), 1);
        assert!(out.contains("ROWSPAN=\"2\""));
    }

    #[test]
    fn test_hosts_without_nics_are_counted() {
        let mut t = two_subnets();
        t.with_host("ghost");
        t.with_host("phantom");
        let (out, stats) = render_string(&t, &RenderOptions::default());
        assert_eq!(stats.hosts_with_no_subnet, 2);
        assert!(!out.contains("ghost"));
    }

    #[test]
    fn test_empty_subnets_counted() {
        let mut t = two_subnets();
        t.declare_subnet(p("192.168.0.0/16"), Some("Unused")).unwrap();
        t.declare_subnet(p("192.168.1.0/24"), Some("AlsoUnused")).unwrap();
        let (_, stats) = render_string(&t, &RenderOptions::default());
        assert_eq!(stats.empty_subnets, 2);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut t = two_subnets();
        let first = render_string(&t, &RenderOptions::default());
        let second = render_string(&t, &RenderOptions::default());
        assert_eq!(first, second);

        t.declare_subnet(p("10.0.1.0/25"), Some("Low")).unwrap();
        let (third, _) = render_string(&t, &RenderOptions::default());
        assert_ne!(first.0, third);
        assert!(third.contains("\"rtr_Site\":\"x\" -- \"Low\":\"x_x1\""));
    }

    #[test]
    fn test_plain_style_has_no_graph_statement() {
        let t = Topology::new();
        let mut gv = GraphViz::new(Vec::new());
        render(&t, &mut gv, &PlainStyle, &RenderOptions::default()).unwrap();
        let out = String::from_utf8(gv.into_inner()).unwrap();
        assert!(out.starts_with("graph ndia {\n\tsubgraph"));
    }

    #[test]
    fn test_unnamed_net_uses_prefix() {
        let mut t = Topology::new();
        t.declare_subnet(p("10.0.0.0/8"), None).unwrap();
        t.add_nic(ip("10.1.1.1"), None).unwrap();
        let (out, _) = render_string(&t, &RenderOptions::default());
        assert!(out.contains("subgraph \"cluster_10.0.0.0/8\" {"));
        assert!(out.contains("label=\"10.0.0.0/8\";"));
    }

    /// Records group nesting and fails the first statement containing `fail_on`.
    struct FailingSink {
        fail_on: &'static str,
        open: Vec<String>,
        closed: Vec<String>,
    }

    impl Sink for FailingSink {
        fn write_statement(&mut self, text: &str) -> std::io::Result<()> {
            if text.contains(self.fail_on) {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "sink full"));
            }
            Ok(())
        }

        fn open_group(&mut self, label: &str) -> std::io::Result<()> {
            self.open.push(label.to_string());
            Ok(())
        }

        fn close_group(&mut self, label: &str) -> std::io::Result<()> {
            self.closed.push(label.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_failed_statement_still_closes_groups() {
        let t = two_subnets();
        let mut sink = FailingSink {
            fail_on: "rtr_Site",
            open: Vec::new(),
            closed: Vec::new(),
        };
        let result = render(&t, &mut sink, &DefaultStyle, &RenderOptions::default());

        assert!(matches!(result, Err(crate::Error::Io(_))), "{result:?}");
        let mut opened = sink.open.clone();
        opened.sort();
        let mut closed = sink.closed.clone();
        closed.sort();
        assert_eq!(opened, closed);
        assert_eq!(sink.closed.last().map(String::as_str), Some("graph ndia"));
        // graph, root, Site, X, Y; the walk stops at Site's routed table
        assert_eq!(sink.open.len(), 5);
    }

    #[test]
    fn test_render_options_set() {
        let mut options = RenderOptions::default();
        options.apply(&Attributes::from([
            ("all_hosts".to_string(), "true".to_string()),
            ("rankdir".to_string(), "LR".to_string()),
        ]));
        assert!(options.all_hosts);
        assert_eq!(options.extra.get("rankdir").map(String::as_str), Some("LR"));

        options.set("all_hosts", "no");
        assert!(!options.all_hosts);
    }
}
