//! Status report fixtures shaped like `crm_mon -fA1 --as-xml` output.

fn node_xml(name: &str, online: bool) -> String {
    format!(
        r#"<node name="{name}" id="1" online="{online}" standby="false" maintenance="false" pending="false" unclean="false" shutdown="false" expected_up="true" is_dc="false" resources_running="1" type="member"/>"#
    )
}

fn report(nodes: &str, attributes: &str, resources: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<crm_mon version="1.1.24">
  <summary>
    <stack type="corosync"/>
    <current_dc present="true" name="pg01" id="1" with_quorum="true"/>
    <nodes_configured number="2" expected_votes="unknown"/>
    <resources_configured number="4" disabled="0" blocked="0"/>
    <cluster_options stonith-enabled="false" symmetric-cluster="true" no-quorum-policy="ignore" maintenance-mode="false"/>
  </summary>
  <nodes>
    {nodes}
  </nodes>
  <node_attributes>
    {attributes}
  </node_attributes>
  <resources>
    {resources}
  </resources>
</crm_mon>"#
    )
}

/// Attribute-based cluster: `pgsql-status` values for pg01 and pg02.
pub fn attribute_status(pg01_value: &str, pg02_value: &str) -> String {
    report(
        &format!("{}\n    {}", node_xml("pg01", true), node_xml("pg02", true)),
        &format!(
            r#"<node name="pg01">
      <attribute name="pgsql-status" value="{pg01_value}"/>
    </node>
    <node name="pg02">
      <attribute name="pgsql-status" value="{pg02_value}"/>
    </node>"#
        ),
        "",
    )
}

/// Attribute-based cluster with pg02 offline.
pub fn attribute_status_node_offline() -> String {
    report(
        &format!("{}\n    {}", node_xml("pg01", true), node_xml("pg02", false)),
        r#"<node name="pg01">
      <attribute name="pgsql-status" value="PRI"/>
    </node>"#,
        "",
    )
}

/// Group-based cluster: the `master-group` resources run on `group_node`.
pub fn group_status(group_node: &str) -> String {
    report(
        &format!("{}\n    {}", node_xml("pg01", true), node_xml("pg02", true)),
        "",
        &format!(
            r#"<group id="master-group" number_resources="2">
      <resource id="vip-master" resource_agent="ocf::heartbeat:IPaddr2" role="Started" active="true" orphaned="false" blocked="false" managed="true" failed="false" failure_ignored="false" nodes_running_on="1">
        <node name="{group_node}" id="1" cached="false"/>
      </resource>
      <resource id="fs-master" resource_agent="ocf::heartbeat:Filesystem" role="Started" active="true" orphaned="false" blocked="false" managed="true" failed="false" failure_ignored="false" nodes_running_on="1">
        <node name="{group_node}" id="1" cached="false"/>
      </resource>
    </group>"#
        ),
    )
}

/// Group-based cluster with a resource that is inactive, blocked, and
/// failed at once.
pub fn group_status_resource_broken() -> String {
    report(
        &format!("{}\n    {}", node_xml("pg01", true), node_xml("pg02", true)),
        "",
        r#"<group id="master-group" number_resources="1">
      <resource id="vip-master" resource_agent="ocf::heartbeat:IPaddr2" role="Stopped" active="false" orphaned="false" blocked="true" managed="true" failed="true" failure_ignored="false" nodes_running_on="0"/>
    </group>"#,
    )
}
