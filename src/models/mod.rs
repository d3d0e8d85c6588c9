//! Data models

pub mod kind;
pub mod status;

pub use kind::ClusterKind;
pub use status::{
    ClusterOptions, ClusterStatus, ClusterSummary, Node, NodeAttribute, NodeAttributes, Resource,
    ResourceClone, ResourceGroup, Resources,
};
