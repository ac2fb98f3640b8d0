//! Stack resource: distributions of services a cluster can be built from.

use std::sync::LazyLock;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_wrapper, LavaClient};
use crate::error::Result;
use crate::request::marshal;
use crate::schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};
use crate::text::bracketed;

pub static SERVICE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Service")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("modes", FieldType::TextList))
});

pub static RESOURCE_LIMITS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ResourceLimits")
        .field(FieldSpec::optional("min_count", FieldType::Int))
        .field(FieldSpec::optional("max_count", FieldType::Int))
        .field(FieldSpec::optional("min_ram", FieldType::Int))
});

pub static STACK_NODE_GROUP: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("StackNodeGroup")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::optional("flavor_id", FieldType::Text))
        .field(FieldSpec::optional("count", FieldType::Int))
        .field(FieldSpec::optional("resource_limits", FieldType::Nested(&RESOURCE_LIMITS)))
        .field(FieldSpec::optional("components", FieldType::Raw))
        .table(
            &[
                "id",
                "flavor_id",
                "count",
                "resource_limits.min_ram",
                "resource_limits.min_count",
                "resource_limits.max_count",
            ],
            &["ID", "Flavor", "Count", "Min RAM", "Min Count", "Max Count"],
        )
});

pub static STACK: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Stack")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("distro", FieldType::Text))
        .field(FieldSpec::optional("description", FieldType::Text))
        .field(FieldSpec::optional("services", FieldType::NestedList(&SERVICE)))
        .table(
            &["id", "name", "distro", "services"],
            &["ID", "Name", "Distro", "Services"],
        )
});

pub static STACK_DETAIL: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("StackDetail")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("distro", FieldType::Text))
        .field(FieldSpec::optional("description", FieldType::Text))
        .field(FieldSpec::optional("services", FieldType::NestedList(&SERVICE)))
        .field(FieldSpec::optional("created", FieldType::Timestamp))
        .field(
            FieldSpec::optional("node_groups", FieldType::NestedList(&STACK_NODE_GROUP)),
        )
});

static SERVICE_REQUEST: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ServiceRequest")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("modes", FieldType::TextList))
});

static STACK_CREATE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("StackCreateRequest")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::required("distro", FieldType::Text))
        .field(FieldSpec::optional("description", FieldType::Text))
        .field(FieldSpec::optional("services", FieldType::NestedList(&SERVICE_REQUEST)))
});

/// Header for the detail view, parallel to [`StackDetail::detail_row`].
pub const DETAIL_HEADER: &[&str] = &[
    "ID", "Name", "Distro", "Description", "Services", "Created", "Node Groups",
];

/// A stack as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack(ModelInstance);

impl Stack {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        STACK.validate(raw).map(Self)
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
    pub fn instance(&self) -> &ModelInstance {
        &self.0
    }

    #[must_use]
    pub fn table_row(&self) -> Vec<String> {
        STACK
            .project(&self.0)
            .iter()
            .map(FieldValue::to_string)
            .collect()
    }

    #[must_use]
    pub fn table_header() -> &'static [&'static str] {
        STACK.table_header
    }
}

impl Serialize for Stack {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A stack as returned by the get endpoint, with node group templates.
#[derive(Debug, Clone, PartialEq)]
pub struct StackDetail(ModelInstance);

impl StackDetail {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        STACK_DETAIL.validate(raw).map(Self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.text("id").unwrap_or_default()
    }

    #[must_use]
    pub fn node_groups(&self) -> Vec<&ModelInstance> {
        self.0.models("node_groups")
    }

    /// `[id1,id2]` summary of the stack's node group ids.
    #[must_use]
    pub fn node_group_id_summary(&self) -> String {
        bracketed(
            self.node_groups()
                .iter()
                .filter_map(|group| group.text("id")),
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
            cell("distro"),
            cell("description"),
            cell("services"),
            cell("created"),
            self.node_group_id_summary(),
        ]
    }

    #[must_use]
    pub fn node_group_rows(&self) -> Vec<Vec<String>> {
        self.node_groups()
            .iter()
            .map(|group| {
                STACK_NODE_GROUP
                    .project(group)
                    .iter()
                    .map(FieldValue::to_string)
                    .collect()
            })
            .collect()
    }
}

impl Serialize for StackDetail {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Parameters for registering a custom stack.
#[derive(Debug, Clone)]
pub struct StackCreateParams {
    pub name: String,
    pub distro: String,
    pub description: Option<String>,
    pub services: Vec<(String, Vec<String>)>,
}

impl StackCreateParams {
    #[must_use]
    pub fn new(name: impl Into<String>, distro: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            distro: distro.into(),
            description: None,
            services: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_service(mut self, name: impl Into<String>, modes: Vec<String>) -> Self {
        self.services.push((name.into(), modes));
        self
    }

    /// Marshal into the `{"stack": {...}}` request envelope.
    pub fn into_body(self) -> Result<Value> {
        let mut params = json!({
            "name": self.name,
            "distro": self.distro,
        });
        if let Some(description) = &self.description {
            params["description"] = json!(description);
        }
        if !self.services.is_empty() {
            params["services"] = Value::Array(
                self.services
                    .iter()
                    .map(|(name, modes)| {
                        if modes.is_empty() {
                            json!({ "name": name })
                        } else {
                            json!({ "name": name, "modes": modes })
                        }
                    })
                    .collect(),
            );
        }
        let body = marshal(&params, &STACK_CREATE)?;
        Ok(json!({ "stack": body }))
    }
}

/// Handler for stack operations.
pub struct StackHandler {
    client: LavaClient,
}

impl StackHandler {
    #[must_use]
    pub fn new(client: LavaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Stack>> {
        debug!("listing stacks");
        let response = self.client.get("stacks", &[]).await?;
        let raw = expect_wrapper(response, "stacks")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Stack::from_raw)
            .collect()
    }

    pub async fn get(&self, stack_id: &str) -> Result<StackDetail> {
        debug!(stack_id, "fetching stack");
        let response = self.client.get(&format!("stacks/{stack_id}"), &[]).await?;
        StackDetail::from_raw(&expect_wrapper(response, "stack")?)
    }

    pub async fn create(&self, params: StackCreateParams) -> Result<StackDetail> {
        debug!(name = %params.name, distro = %params.distro, "creating stack");
        let body = params.into_body()?;
        let response = self.client.post("stacks", body).await?;
        StackDetail::from_raw(&expect_wrapper(response, "stack")?)
    }

    pub async fn delete(&self, stack_id: &str) -> Result<()> {
        debug!(stack_id, "deleting stack");
        self.client.delete(&format!("stacks/{stack_id}")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail_fixture() -> Value {
        json!({
            "id": "stack_id",
            "name": "stack_name",
            "distro": "HDP 2.2",
            "description": "description",
            "services": [{"name": "service_name", "modes": ["mode1"]}],
            "created": "2014-01-01",
            "node_groups": [
                {
                    "id": "id",
                    "flavor_id": "hadoop1-7",
                    "count": 10,
                    "resource_limits": {
                        "min_ram": 1024,
                        "min_count": 1,
                        "max_count": 10
                    }
                }
            ]
        })
    }

    #[test]
    fn list_row_summarizes_services() {
        let raw = json!({
            "id": "stack_id",
            "name": "stack_name",
            "distro": "HDP 2.2",
            "services": [{"name": "service_name", "modes": ["mode1"]}]
        });
        let stack = Stack::from_raw(&raw).unwrap();
        assert_eq!(
            stack.table_row(),
            vec![
                "stack_id",
                "stack_name",
                "HDP 2.2",
                "[{name=service_name,modes=[mode1]}]",
            ]
        );
    }

    #[test]
    fn detail_row_summarizes_node_group_ids() {
        let detail = StackDetail::from_raw(&detail_fixture()).unwrap();
        let row = detail.detail_row();
        assert_eq!(row.len(), DETAIL_HEADER.len());
        assert_eq!(row[6], "[id]");
    }

    #[test]
    fn node_group_rows_use_dotted_resource_limit_paths() {
        let detail = StackDetail::from_raw(&detail_fixture()).unwrap();
        assert_eq!(
            detail.node_group_rows(),
            vec![vec![
                "id".to_string(),
                "hadoop1-7".to_string(),
                "10".to_string(),
                "1024".to_string(),
                "1".to_string(),
                "10".to_string(),
            ]]
        );
    }

    #[test]
    fn missing_resource_limits_project_as_empty_cells() {
        let mut raw = detail_fixture();
        raw["node_groups"][0]
            .as_object_mut()
            .unwrap()
            .remove("resource_limits");
        let detail = StackDetail::from_raw(&raw).unwrap();
        assert_eq!(
            detail.node_group_rows()[0][3..],
            ["".to_string(), "".to_string(), "".to_string()]
        );
    }

    #[test]
    fn create_params_marshal_into_envelope() {
        let params = StackCreateParams::new("custom", "HDP 2.2")
            .with_description("my stack")
            .with_service("HDFS", vec!["Secondary".to_string()]);
        let body = params.into_body().unwrap();
        assert_eq!(
            body,
            json!({
                "stack": {
                    "name": "custom",
                    "distro": "HDP 2.2",
                    "description": "my stack",
                    "services": [{"name": "HDFS", "modes": ["Secondary"]}]
                }
            })
        );
    }
}
