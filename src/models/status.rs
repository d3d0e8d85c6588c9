//! Cluster status data model
//!
//! Typed representation of one point-in-time status report from the cluster
//! resource manager. A snapshot is parsed fresh for every health check and
//! never mutated in place; decisions made on a stale snapshot would be
//! unsafe.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Root snapshot of one manager status report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    /// Cluster-wide metadata. Informational only; never consulted by the
    /// decision engine.
    pub summary: ClusterSummary,

    /// Cluster nodes in report order. Names are unique within a snapshot.
    pub nodes: Vec<Node>,

    /// Per-node published attributes, in report order.
    pub attributes: Vec<NodeAttributes>,

    /// Cluster resources split by membership.
    pub resources: Resources,
}

/// General status of the cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    /// Messaging stack type (e.g. corosync).
    pub stack_type: String,

    /// Name of the designated controller node.
    pub controller_node: String,

    /// Whether the designated controller holds quorum.
    pub with_quorum: bool,

    /// Number of configured nodes.
    pub nodes_configured: u32,

    /// Number of configured resources.
    pub resources_configured: u32,

    /// Cluster-wide policy options.
    pub options: ClusterOptions,
}

/// Cluster policy options reported in the summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterOptions {
    pub stonith_enabled: bool,
    pub symmetric_cluster: bool,
    pub no_quorum_policy: String,
    pub maintenance_mode: bool,
}

/// Status of a single cluster node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node name (unique identifier within the cluster).
    pub name: String,
    pub online: bool,
    pub standby: bool,
    pub maintenance: bool,
    pub pending: bool,
    pub unclean: bool,
    pub shutdown: bool,
}

impl Node {
    /// Names of the status flags that are currently set, in report order.
    pub fn active_flags(&self) -> Vec<&'static str> {
        let flags = [
            ("Online", self.online),
            ("Standby", self.standby),
            ("Maintenance", self.maintenance),
            ("Pending", self.pending),
            ("Unclean", self.unclean),
            ("Shutdown", self.shutdown),
        ];
        flags
            .into_iter()
            .filter_map(|(name, set)| set.then_some(name))
            .collect()
    }
}

/// The attribute set published by one node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttributes {
    /// Name of the node the attributes belong to.
    pub node: String,
    pub attributes: Vec<NodeAttribute>,
}

/// A single named node attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttribute {
    pub name: String,
    pub value: String,
}

/// Collections of standalone, grouped, and cloned resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    pub standalone: Vec<Resource>,
    pub groups: Vec<ResourceGroup>,
    pub clones: Vec<ResourceClone>,
}

/// A named resource group and its member resources, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
    pub resources: Vec<Resource>,
}

/// A named clone set and its member resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceClone {
    pub name: String,
    pub resources: Vec<Resource>,
}

/// A single cluster resource.
///
/// `node_name` is the node the resource is currently placed on; it should
/// reference a name present in [`ClusterStatus::nodes`]. A dangling
/// reference is a data-quality problem in the report, not a fatal one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub node_name: String,
    pub name: String,
    pub agent: String,
    pub role: String,
    pub active: bool,
    pub blocked: bool,
    pub managed: bool,
    pub failed: bool,
}

impl fmt::Display for ClusterSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status Summary:")?;
        writeln!(f, "  Stack Type           : {}", self.stack_type)?;
        writeln!(
            f,
            "  Designated Controller: [ Node: {} | HasQuorum: {} ]",
            self.controller_node, self.with_quorum
        )?;
        writeln!(f, "  Nodes Configured     : {}", self.nodes_configured)?;
        writeln!(f, "  Resources Configured : {}", self.resources_configured)?;
        writeln!(
            f,
            "  Cluster Options      : [ Stonith Enabled: {} | Symmetric Cluster: {} | No Quorum Policy: {} | Maintenance Mode: {} ]",
            self.options.stonith_enabled,
            self.options.symmetric_cluster,
            self.options.no_quorum_policy,
            self.options.maintenance_mode
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "      [ Name: {} | Agent: {} | Role: {} | Active: {} | Blocked: {} | Managed: {} | Failed: {} ]",
            self.name, self.agent, self.role, self.active, self.blocked, self.managed, self.failed
        )
    }
}

impl fmt::Display for ClusterStatus {
    /// Human-readable rendering used in notification bodies.
    ///
    /// Per node: name, the status flags that are currently set (cleared
    /// flags are omitted), then that node's attributes. A resources summary
    /// follows, grouped by standalone/group/clone membership and filtered
    /// to the resources placed on each node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary)?;
        writeln!(f)?;

        for node in &self.nodes {
            writeln!(f, "Node: {}", node.name)?;
            writeln!(f, "  Status:")?;
            for flag in node.active_flags() {
                writeln!(f, "    {flag}: true")?;
            }

            for attrs in &self.attributes {
                if attrs.node == node.name && !attrs.attributes.is_empty() {
                    writeln!(f, "  Attributes:")?;
                    for attr in &attrs.attributes {
                        writeln!(f, "    {}: {}", attr.name, attr.value)?;
                    }
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Resources Summary:")?;

        for node in &self.nodes {
            writeln!(f, "  Node: {}", node.name)?;

            for resource in &self.resources.standalone {
                if resource.node_name == node.name {
                    write!(f, "{resource}")?;
                }
            }

            for group in &self.resources.groups {
                writeln!(f, "    Group: {}", group.name)?;
                for resource in &group.resources {
                    if resource.node_name == node.name {
                        write!(f, "{resource}")?;
                    }
                }
            }

            for clone in &self.resources.clones {
                writeln!(f, "    Clone: {}", clone.name)?;
                for resource in &clone.resources {
                    if resource.node_name == node.name {
                        write!(f, "{resource}")?;
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_status() -> ClusterStatus {
        ClusterStatus {
            summary: ClusterSummary {
                stack_type: "corosync".to_string(),
                controller_node: "pg01".to_string(),
                with_quorum: true,
                nodes_configured: 2,
                resources_configured: 3,
                options: ClusterOptions {
                    stonith_enabled: false,
                    symmetric_cluster: true,
                    no_quorum_policy: "ignore".to_string(),
                    maintenance_mode: false,
                },
            },
            nodes: vec![
                Node {
                    name: "pg01".to_string(),
                    online: true,
                    ..Node::default()
                },
                Node {
                    name: "pg02".to_string(),
                    online: true,
                    standby: true,
                    ..Node::default()
                },
            ],
            attributes: vec![NodeAttributes {
                node: "pg01".to_string(),
                attributes: vec![NodeAttribute {
                    name: "pgsql-status".to_string(),
                    value: "PRI".to_string(),
                }],
            }],
            resources: Resources {
                standalone: vec![Resource {
                    node_name: "pg01".to_string(),
                    name: "stonith-fence".to_string(),
                    agent: "stonith:fence_ipmilan".to_string(),
                    role: "Started".to_string(),
                    active: true,
                    managed: true,
                    ..Resource::default()
                }],
                groups: vec![ResourceGroup {
                    name: "master-group".to_string(),
                    resources: vec![Resource {
                        node_name: "pg01".to_string(),
                        name: "vip-master".to_string(),
                        agent: "ocf::heartbeat:IPaddr2".to_string(),
                        role: "Started".to_string(),
                        active: true,
                        managed: true,
                        ..Resource::default()
                    }],
                }],
                clones: vec![],
            },
        }
    }

    #[test]
    fn test_active_flags_omits_cleared_flags() {
        let node = Node {
            name: "pg01".to_string(),
            online: true,
            unclean: true,
            ..Node::default()
        };
        assert_eq!(node.active_flags(), vec!["Online", "Unclean"]);
    }

    #[test]
    fn test_render_lists_only_set_flags() {
        let rendered = sample_status().to_string();
        assert!(rendered.contains("Node: pg01"));
        assert!(rendered.contains("    Online: true"));
        assert!(rendered.contains("    Standby: true"));
        assert!(!rendered.contains("Maintenance: true"));
        assert!(!rendered.contains("Online: false"));
    }

    #[test]
    fn test_render_includes_attributes_under_owning_node() {
        let rendered = sample_status().to_string();
        let pg01_block = rendered
            .split("Node: pg02")
            .next()
            .expect("pg01 section precedes pg02");
        assert!(pg01_block.contains("pgsql-status: PRI"));
    }

    #[test]
    fn test_render_groups_resources_by_membership() {
        let rendered = sample_status().to_string();
        assert!(rendered.contains("Resources Summary:"));
        assert!(rendered.contains("    Group: master-group"));
        assert!(rendered.contains("Name: vip-master"));
        assert!(rendered.contains("Name: stonith-fence"));
    }

    #[test]
    fn test_render_filters_resources_to_matching_node() {
        let rendered = sample_status().to_string();
        // pg02 runs nothing; its section must end without resource lines.
        let pg02_section = rendered
            .rsplit("  Node: pg02")
            .next()
            .expect("pg02 resource section present");
        assert!(!pg02_section.contains("Name: vip-master"));
    }
}
