//! Cluster status report parsing
//!
//! Turns the XML status document produced by the cluster manager's
//! monitoring command into a [`ClusterStatus`] snapshot. The document is
//! walked event by event; everything of interest lives in element
//! attributes. No side effects.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::models::{
    ClusterStatus, Node, NodeAttribute, NodeAttributes, Resource, ResourceClone, ResourceGroup,
};
use crate::utils::{FailoverError, FailoverResult};

/// Top-level document section currently being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Summary,
    Nodes,
    NodeAttributes,
    Resources,
}

/// Parse a raw XML status report into a [`ClusterStatus`].
///
/// Fails with [`FailoverError::Parse`] on malformed XML or when the input
/// holds no root element at all (empty output from the monitoring command).
pub fn parse_status(xml: &str) -> FailoverResult<ClusterStatus> {
    let mut reader = Reader::from_str(xml);

    let mut status = ClusterStatus::default();
    let mut section = Section::None;
    let mut saw_root = false;

    let mut current_attrs: Option<NodeAttributes> = None;
    let mut current_group: Option<ResourceGroup> = None;
    let mut current_clone: Option<ResourceClone> = None;
    let mut current_resource: Option<Resource> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_root = true;
                open_element(
                    &e,
                    false,
                    &mut status,
                    &mut section,
                    &mut current_attrs,
                    &mut current_group,
                    &mut current_clone,
                    &mut current_resource,
                )?;
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                open_element(
                    &e,
                    true,
                    &mut status,
                    &mut section,
                    &mut current_attrs,
                    &mut current_group,
                    &mut current_clone,
                    &mut current_resource,
                )?;
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                close_element(
                    &name,
                    &mut status,
                    &mut section,
                    &mut current_attrs,
                    &mut current_group,
                    &mut current_clone,
                    &mut current_resource,
                );
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(FailoverError::Parse(e.to_string())),
        }
    }

    if !saw_root {
        return Err(FailoverError::Parse(
            "status report contains no root element".to_string(),
        ));
    }

    Ok(status)
}

#[allow(clippy::too_many_arguments)]
fn open_element(
    e: &BytesStart<'_>,
    self_closing: bool,
    status: &mut ClusterStatus,
    section: &mut Section,
    current_attrs: &mut Option<NodeAttributes>,
    current_group: &mut Option<ResourceGroup>,
    current_clone: &mut Option<ResourceClone>,
    current_resource: &mut Option<Resource>,
) -> FailoverResult<()> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

    match name.as_str() {
        "summary" => *section = Section::Summary,
        "nodes" if *section == Section::None => *section = Section::Nodes,
        "node_attributes" => *section = Section::NodeAttributes,
        "resources" if *section == Section::None => *section = Section::Resources,

        "stack" if *section == Section::Summary => {
            let attrs = attribute_map(e)?;
            status.summary.stack_type = string_attr(&attrs, "type");
        }
        "current_dc" if *section == Section::Summary => {
            let attrs = attribute_map(e)?;
            status.summary.controller_node = string_attr(&attrs, "name");
            status.summary.with_quorum = bool_attr(&attrs, "with_quorum");
        }
        "nodes_configured" if *section == Section::Summary => {
            let attrs = attribute_map(e)?;
            status.summary.nodes_configured = number_attr(&attrs, "number");
        }
        "resources_configured" if *section == Section::Summary => {
            let attrs = attribute_map(e)?;
            status.summary.resources_configured = number_attr(&attrs, "number");
        }
        "cluster_options" if *section == Section::Summary => {
            let attrs = attribute_map(e)?;
            status.summary.options.stonith_enabled = bool_attr(&attrs, "stonith-enabled");
            status.summary.options.symmetric_cluster = bool_attr(&attrs, "symmetric-cluster");
            status.summary.options.no_quorum_policy = string_attr(&attrs, "no-quorum-policy");
            status.summary.options.maintenance_mode = bool_attr(&attrs, "maintenance-mode");
        }

        "node" if *section == Section::Nodes => {
            let attrs = attribute_map(e)?;
            status.nodes.push(Node {
                name: string_attr(&attrs, "name"),
                online: bool_attr(&attrs, "online"),
                standby: bool_attr(&attrs, "standby"),
                maintenance: bool_attr(&attrs, "maintenance"),
                pending: bool_attr(&attrs, "pending"),
                unclean: bool_attr(&attrs, "unclean"),
                shutdown: bool_attr(&attrs, "shutdown"),
            });
        }

        "node" if *section == Section::NodeAttributes => {
            let attrs = attribute_map(e)?;
            let entry = NodeAttributes {
                node: string_attr(&attrs, "name"),
                attributes: Vec::new(),
            };
            if self_closing {
                status.attributes.push(entry);
            } else {
                *current_attrs = Some(entry);
            }
        }
        "attribute" if *section == Section::NodeAttributes => {
            let attrs = attribute_map(e)?;
            if let Some(owner) = current_attrs.as_mut() {
                owner.attributes.push(NodeAttribute {
                    name: string_attr(&attrs, "name"),
                    value: string_attr(&attrs, "value"),
                });
            }
        }

        "group" if *section == Section::Resources => {
            let attrs = attribute_map(e)?;
            let group = ResourceGroup {
                name: string_attr(&attrs, "id"),
                resources: Vec::new(),
            };
            if self_closing {
                status.resources.groups.push(group);
            } else {
                *current_group = Some(group);
            }
        }
        "clone" if *section == Section::Resources => {
            let attrs = attribute_map(e)?;
            let clone = ResourceClone {
                name: string_attr(&attrs, "id"),
                resources: Vec::new(),
            };
            if self_closing {
                status.resources.clones.push(clone);
            } else {
                *current_clone = Some(clone);
            }
        }
        "resource" if *section == Section::Resources => {
            let attrs = attribute_map(e)?;
            let resource = Resource {
                node_name: String::new(),
                name: string_attr(&attrs, "id"),
                agent: string_attr(&attrs, "resource_agent"),
                role: string_attr(&attrs, "role"),
                active: bool_attr(&attrs, "active"),
                blocked: bool_attr(&attrs, "blocked"),
                managed: bool_attr(&attrs, "managed"),
                failed: bool_attr(&attrs, "failed"),
            };
            if self_closing {
                // A stopped resource carries no placement child.
                push_resource(status, current_group, current_clone, resource);
            } else {
                *current_resource = Some(resource);
            }
        }
        "node" if *section == Section::Resources => {
            // Placement child of the enclosing resource element.
            let attrs = attribute_map(e)?;
            if let Some(resource) = current_resource.as_mut() {
                resource.node_name = string_attr(&attrs, "name");
            }
        }

        _ => {}
    }

    Ok(())
}

fn close_element(
    name: &str,
    status: &mut ClusterStatus,
    section: &mut Section,
    current_attrs: &mut Option<NodeAttributes>,
    current_group: &mut Option<ResourceGroup>,
    current_clone: &mut Option<ResourceClone>,
    current_resource: &mut Option<Resource>,
) {
    match name {
        "summary" | "nodes" | "node_attributes" | "resources" => *section = Section::None,
        "node" if *section == Section::NodeAttributes => {
            if let Some(entry) = current_attrs.take() {
                status.attributes.push(entry);
            }
        }
        "resource" if *section == Section::Resources => {
            if let Some(resource) = current_resource.take() {
                push_resource(status, current_group, current_clone, resource);
            }
        }
        "group" if *section == Section::Resources => {
            if let Some(group) = current_group.take() {
                status.resources.groups.push(group);
            }
        }
        "clone" if *section == Section::Resources => {
            if let Some(clone) = current_clone.take() {
                status.resources.clones.push(clone);
            }
        }
        _ => {}
    }
}

fn push_resource(
    status: &mut ClusterStatus,
    current_group: &mut Option<ResourceGroup>,
    current_clone: &mut Option<ResourceClone>,
    resource: Resource,
) {
    if let Some(group) = current_group.as_mut() {
        group.resources.push(resource);
    } else if let Some(clone) = current_clone.as_mut() {
        clone.resources.push(resource);
    } else {
        status.resources.standalone.push(resource);
    }
}

fn attribute_map(e: &BytesStart<'_>) -> FailoverResult<HashMap<String, String>> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| FailoverError::Parse(format!("malformed attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        map.insert(key, value);
    }
    Ok(map)
}

fn string_attr(attrs: &HashMap<String, String>, name: &str) -> String {
    attrs.get(name).cloned().unwrap_or_default()
}

fn bool_attr(attrs: &HashMap<String, String>, name: &str) -> bool {
    attrs.get(name).is_some_and(|v| v == "true")
}

fn number_attr(attrs: &HashMap<String, String>, name: &str) -> u32 {
    attrs.get(name).and_then(|v| v.parse().ok()).unwrap_or_default()
}
