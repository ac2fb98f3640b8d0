//! Cluster resource: schemas, typed wrappers, and handler.

use std::sync::LazyLock;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_wrapper, LavaClient};
use crate::error::Result;
use crate::progress::{wait_for_status, ProgressCallback, StatusSource};
use crate::request::marshal;
use crate::schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};
use crate::text::bracketed;

/// Statuses at which a cluster stops changing on its own.
pub const TERMINAL_STATUSES: &[&str] = &["ACTIVE", "ERROR"];

pub static NODE_GROUP: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("NodeGroup")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::optional("flavor_id", FieldType::Text))
        .field(FieldSpec::optional("count", FieldType::Int))
        .field(FieldSpec::optional("components", FieldType::Raw))
        .table(
            &["id", "flavor_id", "count", "components"],
            &["ID", "Flavor", "Count", "Components"],
        )
});

pub static CLUSTER_SCRIPT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ClusterScript")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("status", FieldType::Text))
        .table(&["id", "name", "status"], &["ID", "Name", "Status"])
});

pub static CLUSTER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Cluster")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::required("status", FieldType::Text))
        .field(FieldSpec::required("stack_id", FieldType::Text))
        .field(FieldSpec::required("created", FieldType::Timestamp))
        .field(FieldSpec::optional("updated", FieldType::Timestamp))
        .table(
            &["id", "name", "status", "stack_id", "created"],
            &["ID", "Name", "Status", "Stack", "Created"],
        )
});

pub static CLUSTER_DETAIL: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ClusterDetail")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::required("status", FieldType::Text))
        .field(FieldSpec::required("stack_id", FieldType::Text))
        .field(FieldSpec::required("created", FieldType::Timestamp))
        .field(FieldSpec::optional("updated", FieldType::Timestamp))
        .field(FieldSpec::optional("username", FieldType::Text))
        .field(FieldSpec::optional("progress", FieldType::Float))
        .field(FieldSpec::optional("node_groups", FieldType::NestedList(&NODE_GROUP)))
        .field(FieldSpec::optional("scripts", FieldType::NestedList(&CLUSTER_SCRIPT)))
});

static NODE_GROUP_REQUEST: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("NodeGroupRequest")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::optional("count", FieldType::Int))
        .field(FieldSpec::optional("flavor_id", FieldType::Text))
});

static CLUSTER_CREATE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ClusterCreateRequest")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::required("username", FieldType::Text))
        .field(FieldSpec::required("keypair_name", FieldType::Text))
        .field(FieldSpec::required("stack_id", FieldType::Text))
        .field(
            FieldSpec::optional("node_groups", FieldType::NestedList(&NODE_GROUP_REQUEST)),
        )
});

/// Header for the detail view, parallel to [`ClusterDetail::detail_row`].
pub const DETAIL_HEADER: &[&str] = &[
    "ID", "Name", "Status", "Stack", "Created", "Nodes", "Username", "Progress",
];

/// A cluster as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster(ModelInstance);

impl Cluster {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        CLUSTER.validate(raw).map(Self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.text("id").unwrap_or_default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.0.text("name").unwrap_or_default()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        self.0.text("status").unwrap_or_default()
    }

    #[must_use]
    pub fn instance(&self) -> &ModelInstance {
        &self.0
    }

    #[must_use]
    pub fn table_row(&self) -> Vec<String> {
        CLUSTER
            .project(&self.0)
            .iter()
            .map(FieldValue::to_string)
            .collect()
    }

    #[must_use]
    pub fn table_header() -> &'static [&'static str] {
        CLUSTER.table_header
    }
}

impl Serialize for Cluster {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A cluster as returned by the get endpoint, with node groups and
/// attached scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterDetail(ModelInstance);

impl ClusterDetail {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        CLUSTER_DETAIL.validate(raw).map(Self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.text("id").unwrap_or_default()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        self.0.text("status").unwrap_or_default()
    }

    #[must_use]
    pub fn node_groups(&self) -> Vec<&ModelInstance> {
        self.0.models("node_groups")
    }

    #[must_use]
    pub fn scripts(&self) -> Vec<&ModelInstance> {
        self.0.models("scripts")
    }

    /// Total node count across all node groups.
    #[must_use]
    pub fn node_count(&self) -> i64 {
        self.node_groups()
            .iter()
            .filter_map(|group| group.int("count"))
            .sum()
    }

    /// `[id1,id2]` summary of attached script ids.
    #[must_use]
    pub fn script_id_summary(&self) -> String {
        bracketed(
            self.scripts()
                .iter()
                .filter_map(|script| script.text("id")),
        )
    }

    #[must_use]
    pub fn instance(&self) -> &ModelInstance {
        &self.0
    }

    /// Values for the single-row detail table, parallel to [`DETAIL_HEADER`].
    #[must_use]
    pub fn detail_row(&self) -> Vec<String> {
        let cell = |name: &str| {
            self.0
                .get(name)
                .map(FieldValue::to_string)
                .unwrap_or_default()
        };
        vec![
            cell("id"),
            cell("name"),
            cell("status"),
            cell("stack_id"),
            cell("created"),
            self.node_count().to_string(),
            cell("username"),
            cell("progress"),
        ]
    }

    #[must_use]
    pub fn node_group_rows(&self) -> Vec<Vec<String>> {
        self.node_groups()
            .iter()
            .map(|group| {
                NODE_GROUP
                    .project(group)
                    .iter()
                    .map(FieldValue::to_string)
                    .collect()
            })
            .collect()
    }

    #[must_use]
    pub fn script_rows(&self) -> Vec<Vec<String>> {
        self.scripts()
            .iter()
            .map(|script| {
                CLUSTER_SCRIPT
                    .project(script)
                    .iter()
                    .map(FieldValue::to_string)
                    .collect()
            })
            .collect()
    }
}

impl Serialize for ClusterDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl StatusSource for ClusterDetail {
    fn status(&self) -> &str {
        ClusterDetail::status(self)
    }
}

/// One node group in a create request.
#[derive(Debug, Clone, Default)]
pub struct NodeGroupSpec {
    pub id: String,
    pub count: Option<i64>,
    pub flavor_id: Option<String>,
}

impl NodeGroupSpec {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_flavor_id(mut self, flavor_id: impl Into<String>) -> Self {
        self.flavor_id = Some(flavor_id.into());
        self
    }

    fn to_json(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("id".to_string(), json!(self.id));
        if let Some(count) = self.count {
            map.insert("count".to_string(), json!(count));
        }
        if let Some(flavor_id) = &self.flavor_id {
            map.insert("flavor_id".to_string(), json!(flavor_id));
        }
        Value::Object(map)
    }
}

/// Parameters for creating a cluster.
#[derive(Debug, Clone)]
pub struct ClusterCreateParams {
    pub name: String,
    pub username: String,
    pub keypair_name: String,
    pub stack_id: String,
    pub node_groups: Vec<NodeGroupSpec>,
}

impl ClusterCreateParams {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        keypair_name: impl Into<String>,
        stack_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            keypair_name: keypair_name.into(),
            stack_id: stack_id.into(),
            node_groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_node_group(mut self, group: NodeGroupSpec) -> Self {
        self.node_groups.push(group);
        self
    }

    /// Marshal into the `{"cluster": {...}}` request envelope.
    pub fn into_body(self) -> Result<Value> {
        let mut params = json!({
            "name": self.name,
            "username": self.username,
            "keypair_name": self.keypair_name,
            "stack_id": self.stack_id,
        });
        if !self.node_groups.is_empty() {
            params["node_groups"] = Value::Array(
                self.node_groups.iter().map(NodeGroupSpec::to_json).collect(),
            );
        }
        let body = marshal(&params, &CLUSTER_CREATE)?;
        Ok(json!({ "cluster": body }))
    }
}

/// Handler for cluster operations.
pub struct ClusterHandler {
    client: LavaClient,
}

impl ClusterHandler {
    #[must_use]
    pub fn new(client: LavaClient) -> Self {
        Self { client }
    }

    /// List all clusters for the tenant.
    pub async fn list(&self) -> Result<Vec<Cluster>> {
        debug!("listing clusters");
        let response = self.client.get("clusters", &[]).await?;
        let raw = expect_wrapper(response, "clusters")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Cluster::from_raw)
            .collect()
    }

    /// Fetch one cluster with node groups and scripts.
    pub async fn get(&self, cluster_id: &str) -> Result<ClusterDetail> {
        debug!(cluster_id, "fetching cluster");
        let response = self.client.get(&format!("clusters/{cluster_id}"), &[]).await?;
        ClusterDetail::from_raw(&expect_wrapper(response, "cluster")?)
    }

    /// Provision a new cluster.
    pub async fn create(&self, params: ClusterCreateParams) -> Result<ClusterDetail> {
        debug!(name = %params.name, stack_id = %params.stack_id, "creating cluster");
        let body = params.into_body()?;
        let response = self.client.post("clusters", body).await?;
        ClusterDetail::from_raw(&expect_wrapper(response, "cluster")?)
    }

    /// Delete a cluster.
    pub async fn delete(&self, cluster_id: &str) -> Result<()> {
        debug!(cluster_id, "deleting cluster");
        self.client.delete(&format!("clusters/{cluster_id}")).await?;
        Ok(())
    }

    /// Poll the cluster until it reaches ACTIVE or ERROR.
    pub async fn wait(
        &self,
        cluster_id: &str,
        interval: Duration,
        timeout: Option<Duration>,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<ClusterDetail> {
        wait_for_status(
            cluster_id,
            TERMINAL_STATUSES,
            interval,
            timeout,
            on_progress,
            || self.get(cluster_id),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn fixture() -> Value {
        json!({
            "id": "cluster_id",
            "name": "cluster_name",
            "created": "2014-01-01",
            "updated": null,
            "status": "PENDING",
            "stack_id": "stack_id",
            "node_groups": [
                {
                    "id": "node_id",
                    "count": 1,
                    "flavor_id": "hadoop1-60",
                    "components": {}
                }
            ]
        })
    }

    #[test]
    fn detail_parses_the_canonical_fixture() {
        let detail = ClusterDetail::from_raw(&fixture()).unwrap();
        assert_eq!(detail.id(), "cluster_id");
        assert_eq!(detail.status(), "PENDING");
        assert_eq!(
            detail.instance().timestamp("created"),
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(detail.instance().get("updated"), Some(&FieldValue::Null));

        let groups = detail.node_groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].int("count"), Some(1));
        assert_eq!(detail.node_count(), 1);
    }

    #[test]
    fn list_row_projection() {
        let raw = json!({
            "id": "cluster_id",
            "name": "cluster_name",
            "status": "ACTIVE",
            "stack_id": "stack_id",
            "created": "2014-01-01"
        });
        let cluster = Cluster::from_raw(&raw).unwrap();
        assert_eq!(
            cluster.table_row(),
            vec![
                "cluster_id",
                "cluster_name",
                "ACTIVE",
                "stack_id",
                "2014-01-01 00:00:00",
            ]
        );
        assert_eq!(
            Cluster::table_header(),
            &["ID", "Name", "Status", "Stack", "Created"]
        );
    }

    #[test]
    fn detail_row_includes_computed_node_count() {
        let mut raw = fixture();
        raw["username"] = json!("username");
        raw["progress"] = json!(1.0);
        let detail = ClusterDetail::from_raw(&raw).unwrap();
        assert_eq!(
            detail.detail_row(),
            vec![
                "cluster_id",
                "cluster_name",
                "PENDING",
                "stack_id",
                "2014-01-01 00:00:00",
                "1",
                "username",
                "1.0",
            ]
        );
    }

    #[test]
    fn node_group_row_renders_components() {
        let mut raw = fixture();
        raw["node_groups"][0]["components"] = json!([{"name": "component"}]);
        let detail = ClusterDetail::from_raw(&raw).unwrap();
        assert_eq!(
            detail.node_group_rows(),
            vec![vec![
                "node_id".to_string(),
                "hadoop1-60".to_string(),
                "1".to_string(),
                "[{name=component}]".to_string(),
            ]]
        );
    }

    #[test]
    fn script_rows_and_summary() {
        let mut raw = fixture();
        raw["scripts"] = json!([
            {"id": "script_id", "name": "name", "status": "ACTIVE"}
        ]);
        let detail = ClusterDetail::from_raw(&raw).unwrap();
        assert_eq!(
            detail.script_rows(),
            vec![vec![
                "script_id".to_string(),
                "name".to_string(),
                "ACTIVE".to_string(),
            ]]
        );
        assert_eq!(detail.script_id_summary(), "[script_id]");
    }

    #[test]
    fn create_params_marshal_into_envelope() {
        let params = ClusterCreateParams::new("name", "user", "keypair", "stack")
            .with_node_group(NodeGroupSpec::new("slave").with_count(10).with_flavor_id("hadoop1-7"));
        let body = params.into_body().unwrap();
        assert_eq!(
            body,
            json!({
                "cluster": {
                    "name": "name",
                    "username": "user",
                    "keypair_name": "keypair",
                    "stack_id": "stack",
                    "node_groups": [
                        {"id": "slave", "count": 10, "flavor_id": "hadoop1-7"}
                    ]
                }
            })
        );
    }

    #[test]
    fn create_params_omit_empty_node_groups() {
        let body = ClusterCreateParams::new("name", "user", "keypair", "stack")
            .into_body()
            .unwrap();
        assert!(body["cluster"].get("node_groups").is_none());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut raw = fixture();
        raw.as_object_mut().unwrap().remove("stack_id");
        let err = ClusterDetail::from_raw(&raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "ClusterDetail: missing required field 'stack_id'"
        );
    }
}
