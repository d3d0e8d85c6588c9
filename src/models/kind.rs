//! Cluster kind selection
//!
//! The two supported cluster topologies differ in how the current primary
//! node is discovered and in the external action that swaps the primary
//! role. Everything else about a failover run is identical, so the engine
//! is parameterized by this value.

use serde::{Deserialize, Serialize};

/// Topology-specific strategy for locating the primary node and performing
/// the role swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClusterKind {
    /// The primary is the node running the first resource of the named
    /// group (e.g. a virtual-IP/application group pinned to one node).
    /// The role swap is a move/clear/verify protocol on that group.
    GroupBased { group_name: String },

    /// The primary is the node publishing the given attribute name/value
    /// pair (e.g. a replication role tag). The role swap is a single
    /// switchover command.
    AttributeBased {
        attribute_name: String,
        attribute_value: String,
        switchover_command: String,
    },
}

impl ClusterKind {
    /// Command that moves the resource group to another node. Moving also
    /// creates an implicit location constraint pinning the group, which
    /// must be cleared afterwards.
    pub fn move_command(group_name: &str) -> String {
        format!("pcs resource move {group_name}")
    }

    /// Command that clears the location constraint left behind by a move.
    pub fn clear_command(group_name: &str) -> String {
        format!("pcs resource clear {group_name}")
    }

    /// Command that lists the current location constraints.
    pub const CONSTRAINT_QUERY: &'static str = "pcs constraint location";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_commands_name_the_group() {
        assert_eq!(
            ClusterKind::move_command("master-group"),
            "pcs resource move master-group"
        );
        assert_eq!(
            ClusterKind::clear_command("master-group"),
            "pcs resource clear master-group"
        );
    }

    #[test]
    fn test_kind_serializes_with_tag() {
        let kind = ClusterKind::GroupBased {
            group_name: "master-group".to_string(),
        };
        let yaml = serde_norway::to_string(&kind).expect("serializes");
        assert!(yaml.contains("kind: groupbased"));
    }
}
