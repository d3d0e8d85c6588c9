//! Cluster health evaluation
//!
//! Pure predicates over a status snapshot. Attribute values are not part of
//! the health policy; what a given attribute means is cluster-specific and
//! is only interpreted by the primary-node locator.

use crate::models::{ClusterStatus, Node, Resource};
use crate::utils::HealthError;

/// A node is healthy when it is online and none of the negative status
/// flags are set.
pub fn is_node_healthy(node: &Node) -> bool {
    node.online
        && !node.standby
        && !node.maintenance
        && !node.pending
        && !node.unclean
        && !node.shutdown
}

/// A resource is unhealthy only when it is inactive, blocked, and failed
/// all at once. Any other combination counts as healthy, including a
/// resource that is merely inactive or merely failed.
pub fn is_resource_healthy(resource: &Resource) -> bool {
    !(!resource.active && resource.blocked && resource.failed)
}

/// Check every node, then every standalone, grouped, and cloned resource in
/// that order. The first violation found is returned; violations are not
/// aggregated.
pub fn evaluate_cluster_health(status: &ClusterStatus) -> Result<(), HealthError> {
    for node in &status.nodes {
        if !is_node_healthy(node) {
            return Err(HealthError::UnhealthyNode {
                name: node.name.clone(),
            });
        }
    }

    let resources = status
        .resources
        .standalone
        .iter()
        .chain(status.resources.groups.iter().flat_map(|g| &g.resources))
        .chain(status.resources.clones.iter().flat_map(|c| &c.resources));

    for resource in resources {
        if !is_resource_healthy(resource) {
            return Err(HealthError::UnhealthyResource {
                name: resource.name.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ResourceGroup, Resources};

    fn node_from_bits(bits: u8) -> Node {
        Node {
            name: "n".to_string(),
            online: bits & 0b000001 != 0,
            standby: bits & 0b000010 != 0,
            maintenance: bits & 0b000100 != 0,
            pending: bits & 0b001000 != 0,
            unclean: bits & 0b010000 != 0,
            shutdown: bits & 0b100000 != 0,
        }
    }

    #[test]
    fn test_node_health_truth_table() {
        // Healthy iff online is the only flag set.
        for bits in 0..64u8 {
            let node = node_from_bits(bits);
            let expected = bits == 0b000001;
            assert_eq!(
                is_node_healthy(&node),
                expected,
                "flag combination {bits:#08b}"
            );
        }
    }

    #[test]
    fn test_resource_health_truth_table() {
        // Unhealthy iff !active && blocked && failed, exactly.
        for bits in 0..8u8 {
            let resource = Resource {
                active: bits & 0b001 != 0,
                blocked: bits & 0b010 != 0,
                failed: bits & 0b100 != 0,
                ..Resource::default()
            };
            let expected_unhealthy = !resource.active && resource.blocked && resource.failed;
            assert_eq!(
                is_resource_healthy(&resource),
                !expected_unhealthy,
                "flag combination {bits:#05b}"
            );
        }
    }

    #[test]
    fn test_inactive_failed_but_unblocked_is_healthy() {
        let resource = Resource {
            active: false,
            blocked: false,
            failed: true,
            ..Resource::default()
        };
        assert!(is_resource_healthy(&resource));
    }

    #[test]
    fn test_first_violation_is_the_node() {
        // Both an unhealthy node and an unhealthy resource: the node wins.
        let status = ClusterStatus {
            nodes: vec![
                Node {
                    name: "pg01".to_string(),
                    online: true,
                    ..Node::default()
                },
                Node {
                    name: "pg02".to_string(),
                    online: false,
                    ..Node::default()
                },
            ],
            resources: Resources {
                groups: vec![ResourceGroup {
                    name: "master-group".to_string(),
                    resources: vec![Resource {
                        name: "vip-master".to_string(),
                        active: false,
                        blocked: true,
                        failed: true,
                        ..Resource::default()
                    }],
                }],
                ..Resources::default()
            },
            ..ClusterStatus::default()
        };

        let err = evaluate_cluster_health(&status).expect_err("unhealthy cluster");
        assert_eq!(
            err,
            HealthError::UnhealthyNode {
                name: "pg02".to_string()
            }
        );
    }

    #[test]
    fn test_standalone_violation_reported_before_group_violation() {
        let unhealthy = Resource {
            active: false,
            blocked: true,
            failed: true,
            ..Resource::default()
        };
        let status = ClusterStatus {
            nodes: vec![Node {
                name: "pg01".to_string(),
                online: true,
                ..Node::default()
            }],
            resources: Resources {
                standalone: vec![Resource {
                    name: "fence".to_string(),
                    ..unhealthy.clone()
                }],
                groups: vec![ResourceGroup {
                    name: "g".to_string(),
                    resources: vec![Resource {
                        name: "vip".to_string(),
                        ..unhealthy
                    }],
                }],
                ..Resources::default()
            },
            ..ClusterStatus::default()
        };

        let err = evaluate_cluster_health(&status).expect_err("unhealthy cluster");
        assert_eq!(
            err,
            HealthError::UnhealthyResource {
                name: "fence".to_string()
            }
        );
    }

    #[test]
    fn test_healthy_cluster_passes() {
        let status = ClusterStatus {
            nodes: vec![Node {
                name: "pg01".to_string(),
                online: true,
                ..Node::default()
            }],
            ..ClusterStatus::default()
        };
        assert!(evaluate_cluster_health(&status).is_ok());
    }
}
