use std::collections::BTreeMap;

use crate::literal::parse_integer;
use crate::sectionmap::{Section, SectionMap};
use crate::writer::Writer;

const TOPOLOGY: &str = "Topology";
const MAX_NODE_ID: u8 = 127;

/// A nodelist project: the topology of one or more CANopen networks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodelistProject {
    pub networks: Vec<NetworkTopology>,
    /// all sections other than the topology sections, in file order
    pub additional_sections: SectionMap,
}

/// The nodes of one network
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkTopology {
    pub net_name: Option<String>,
    pub net_refd: Option<String>,
    pub eds_base_name: Option<String>,
    pub nodes: BTreeMap<u8, NetworkNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkNode {
    pub node_id: u8,
    pub present: bool,
    pub name: Option<String>,
    pub refd: Option<String>,
    /// name of the DCF that configures this node
    pub dcf_file_name: Option<String>,
}

// "Topology" or "Topology<n>"
fn is_topology_section(name: &str) -> bool {
    match name.get(..TOPOLOGY.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(TOPOLOGY) => {
            let suffix = &name[TOPOLOGY.len()..];
            suffix.is_empty() || suffix.bytes().all(|c| c.is_ascii_digit())
        }
        _ => false,
    }
}

pub(crate) fn parse_nodelist(sections: &SectionMap) -> NodelistProject {
    let mut project = NodelistProject::default();
    for section in sections {
        if is_topology_section(section.name()) {
            project.networks.push(parse_topology(section));
        } else {
            project.additional_sections.push(section.clone());
        }
    }
    log::debug!(
        "nodelist: {} networks, {} additional sections",
        project.networks.len(),
        project.additional_sections.len()
    );
    project
}

fn parse_topology(section: &Section) -> NetworkTopology {
    let mut topology = NetworkTopology {
        net_name: get_optional_string(section, "NetName"),
        net_refd: get_optional_string(section, "NetRefd"),
        eds_base_name: get_optional_string(section, "EDSBaseName"),
        nodes: BTreeMap::new(),
    };

    for node_id in 1..=MAX_NODE_ID {
        let Some(present) = section.get(&format!("Node{node_id}Present")) else {
            continue;
        };
        if present.is_empty() {
            continue;
        }
        let node = NetworkNode {
            node_id,
            present: parse_integer::<u32>(present, None).is_ok_and(|value| value == 1),
            name: get_optional_string(section, &format!("Node{node_id}Name")),
            refd: get_optional_string(section, &format!("Node{node_id}Refd")),
            dcf_file_name: get_optional_string(section, &format!("Node{node_id}DCFName")),
        };
        topology.nodes.insert(node_id, node);
    }

    topology
}

fn get_optional_string(section: &Section, key: &str) -> Option<String> {
    section
        .get(key)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

pub(crate) fn write_nodelist(project: &NodelistProject, banner: Option<&str>) -> String {
    let mut writer = Writer::new();
    if let Some(banner) = banner {
        writer.add_comment(banner);
    }

    for (position, topology) in project.networks.iter().enumerate() {
        let name = if position == 0 {
            TOPOLOGY.to_string()
        } else {
            format!("{TOPOLOGY}{}", position + 1)
        };
        writer.begin_section(&name);
        writer.add_optional_str("NetName", topology.net_name.as_deref());
        writer.add_optional_str("NetRefd", topology.net_refd.as_deref());
        writer.add_str("Nodes", &format!("0x{:02X}", topology.nodes.len()));
        for (node_id, node) in &topology.nodes {
            let present = if node.present { "0x01" } else { "0x00" };
            writer.add_str(&format!("Node{node_id}Present"), present);
            writer.add_optional_str(&format!("Node{node_id}Name"), node.name.as_deref());
            writer.add_optional_str(&format!("Node{node_id}Refd"), node.refd.as_deref());
            writer.add_optional_str(
                &format!("Node{node_id}DCFName"),
                node.dcf_file_name.as_deref(),
            );
        }
        writer.add_optional_str("EDSBaseName", topology.eds_base_name.as_deref());
        writer.end_section();
    }

    for section in &project.additional_sections {
        if !writer.has_written(section.name()) {
            writer.add_section(section);
        }
    }

    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    static NODELIST: &str = r#"
[Topology]
NetName=Line 1
Nodes=0x03
Node2Present=0x01
Node2Name=Drive
Node2DCFName=drive.dcf
Node5Present=1
Node9Present=0x00
Node200Present=0x01
EDSBaseName=eds/

[Topology2]
NetName=Line 2
Node1Present=0x01

[ToolInfo]
Vendor=ACME
"#;

    #[test]
    fn parse() {
        let sections = tokenize("test.cpj", NODELIST, 1024 * 1024).unwrap();
        let project = parse_nodelist(&sections);
        assert_eq!(project.networks.len(), 2);

        let first = &project.networks[0];
        assert_eq!(first.net_name.as_deref(), Some("Line 1"));
        assert_eq!(first.net_refd, None);
        assert_eq!(first.eds_base_name.as_deref(), Some("eds/"));
        assert_eq!(first.nodes.len(), 3);
        assert!(first.nodes[&2].present);
        assert_eq!(first.nodes[&2].name.as_deref(), Some("Drive"));
        assert_eq!(first.nodes[&2].dcf_file_name.as_deref(), Some("drive.dcf"));
        assert!(first.nodes[&5].present);
        assert!(!first.nodes[&9].present);

        assert_eq!(project.networks[1].nodes.len(), 1);
        assert_eq!(project.additional_sections.len(), 1);
        assert_eq!(
            project.additional_sections.get("toolinfo").unwrap().get("Vendor"),
            Some("ACME")
        );
    }

    #[test]
    fn topology_names() {
        assert!(is_topology_section("Topology"));
        assert!(is_topology_section("topology12"));
        assert!(!is_topology_section("TopologyX"));
        assert!(!is_topology_section("Topo"));
    }

    #[test]
    fn write() {
        let sections = tokenize("test.cpj", NODELIST, 1024 * 1024).unwrap();
        let project = parse_nodelist(&sections);
        let text = write_nodelist(&project, None);
        assert!(text.starts_with("[Topology]\nNetName=Line 1\nNodes=0x03\nNode2Present=0x01\n"));
        assert!(text.contains("[Topology2]\nNetName=Line 2\nNodes=0x01\nNode1Present=0x01\n"));
        assert!(text.contains("Node9Present=0x00\n"));
        assert!(text.contains("[ToolInfo]\nVendor=ACME\n"));

        let reloaded = parse_nodelist(&tokenize("test.cpj", &text, 1024 * 1024).unwrap());
        assert_eq!(reloaded, project);
    }
}
