//! Primary-node location
//!
//! Two strategies, selected by [`ClusterKind`]: group-based clusters derive
//! the primary from where a well-known resource group runs; attribute-based
//! clusters derive it from a published node attribute.

use crate::models::{ClusterKind, ClusterStatus};
use crate::utils::LocatorError;

/// Determine the cluster's current primary node.
///
/// Group-based: the node running the first resource of the configured
/// group. Attribute-based: the node whose attribute set carries the
/// configured name/value pair. A cluster where more than one node carries
/// the primary attribute is reported as ambiguous rather than resolved to
/// the first match.
pub fn locate_primary(status: &ClusterStatus, kind: &ClusterKind) -> Result<String, LocatorError> {
    match kind {
        ClusterKind::GroupBased { group_name } => status
            .resources
            .groups
            .iter()
            .find(|group| &group.name == group_name)
            .and_then(|group| group.resources.first())
            .map(|resource| resource.node_name.clone())
            .ok_or(LocatorError::PrimaryNotFound),

        ClusterKind::AttributeBased {
            attribute_name,
            attribute_value,
            ..
        } => {
            let matches: Vec<String> = status
                .attributes
                .iter()
                .filter(|entry| {
                    entry
                        .attributes
                        .iter()
                        .any(|a| &a.name == attribute_name && &a.value == attribute_value)
                })
                .map(|entry| entry.node.clone())
                .collect();

            match matches.len() {
                0 => Err(LocatorError::PrimaryNotFound),
                1 => Ok(matches.into_iter().next().unwrap_or_default()),
                _ => Err(LocatorError::AmbiguousPrimary { nodes: matches }),
            }
        }
    }
}
