//! Workload resource: workload catalog and sizing recommendations.

use std::sync::LazyLock;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_wrapper, LavaClient};
use crate::error::Result;
use crate::request::marshal;
use crate::schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};
use crate::text::wrap;

/// Width of the wrapped description column in workload tables.
const DESCRIPTION_WIDTH: usize = 30;

pub static WORKLOAD: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Workload")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("caption", FieldType::Text))
        .field(FieldSpec::optional("description", FieldType::Text))
});

pub static SIZE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("SizeRecommendation")
        .field(FieldSpec::required("flavor", FieldType::Text))
        .field(FieldSpec::required("minutes", FieldType::Float))
        .field(FieldSpec::required("nodecount", FieldType::Int))
        .field(
            FieldSpec::optional("recommended", FieldType::Bool)
                .default_value(FieldValue::Bool(false)),
        )
        .table(
            &["flavor", "nodecount", "minutes", "recommended"],
            &["Flavor", "Nodes", "Minutes", "Recommended"],
        )
});

pub static RECOMMENDATION: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Recommendation")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("description", FieldType::Text))
        .field(FieldSpec::optional("requires", FieldType::TextList))
        .field(FieldSpec::optional("sizes", FieldType::NestedList(&SIZE)))
});

static RECOMMENDATION_PARAMS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("RecommendationParams")
        .field(FieldSpec::required("storagesize", FieldType::Float))
        .field(
            FieldSpec::optional("persistent", FieldType::Text)
                .choices(&["all", "none", "data"]),
        )
});

/// Header for the workload table, parallel to [`Workload::table_row`].
pub const WORKLOAD_HEADER: &[&str] = &["ID", "Name", "Caption", "Description"];

/// A catalog workload type.
#[derive(Debug, Clone, PartialEq)]
pub struct Workload(ModelInstance);

impl Workload {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        WORKLOAD.validate(raw).map(Self)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.0.text("id").unwrap_or_default()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.0.text("name").unwrap_or_default()
    }

    /// Description wrapped for the table column.
    #[must_use]
    pub fn wrapped_description(&self) -> String {
        wrap(
            self.0.text("description").unwrap_or_default(),
            DESCRIPTION_WIDTH,
        )
    }

    #[must_use]
    pub fn instance(&self) -> &ModelInstance {
        &self.0
    }

    /// Row for the workload table, parallel to [`WORKLOAD_HEADER`].
    #[must_use]
    pub fn table_row(&self) -> Vec<String> {
        vec![
            self.id().to_string(),
            self.name().to_string(),
            self.0.text("caption").unwrap_or_default().to_string(),
            self.wrapped_description(),
        ]
    }
}

impl Serialize for Workload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// A sizing recommendation for one workload profile.
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation(ModelInstance);

impl Recommendation {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        RECOMMENDATION.validate(raw).map(Self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.0.text("name").unwrap_or_default()
    }

    #[must_use]
    pub fn sizes(&self) -> Vec<&ModelInstance> {
        self.0.models("sizes")
    }

    #[must_use]
    pub fn instance(&self) -> &ModelInstance {
        &self.0
    }

    #[must_use]
    pub fn size_rows(&self) -> Vec<Vec<String>> {
        self.sizes()
            .iter()
            .map(|size| {
                SIZE.project(size)
                    .iter()
                    .map(FieldValue::to_string)
                    .collect()
            })
            .collect()
    }
}

impl Serialize for Recommendation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Query parameters for the recommendations endpoint.
#[derive(Debug, Clone)]
pub struct RecommendationParams {
    pub storage_size: f64,
    pub persistent: Option<String>,
}

impl RecommendationParams {
    #[must_use]
    pub fn new(storage_size: f64) -> Self {
        Self {
            storage_size,
            persistent: None,
        }
    }

    #[must_use]
    pub fn with_persistent(mut self, persistent: impl Into<String>) -> Self {
        self.persistent = Some(persistent.into());
        self
    }

    /// Validate and flatten into query pairs.
    pub fn into_query(self) -> Result<Vec<(&'static str, String)>> {
        let mut params = json!({ "storagesize": self.storage_size });
        if let Some(persistent) = &self.persistent {
            params["persistent"] = json!(persistent);
        }
        let body = marshal(&params, &RECOMMENDATION_PARAMS)?;

        let mut query = Vec::new();
        if let Some(size) = body.get("storagesize") {
            query.push(("storagesize", render_number(size)));
        }
        if let Some(persistent) = body.get("persistent").and_then(Value::as_str) {
            query.push(("persistent", persistent.to_string()));
        }
        Ok(query)
    }
}

fn render_number(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Handler for workload operations.
pub struct WorkloadHandler {
    client: LavaClient,
}

impl WorkloadHandler {
    #[must_use]
    pub fn new(client: LavaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Workload>> {
        debug!("listing workloads");
        let response = self.client.get("workloads", &[]).await?;
        let raw = expect_wrapper(response, "workloads")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Workload::from_raw)
            .collect()
    }

    /// Sizing recommendations for one workload at a given storage size.
    pub async fn recommendations(
        &self,
        workload_id: &str,
        params: RecommendationParams,
    ) -> Result<Vec<Recommendation>> {
        debug!(workload_id, "fetching recommendations");
        let query = params.into_query()?;
        let response = self
            .client
            .get(&format!("workloads/{workload_id}/recommendations"), &query)
            .await?;
        let raw = expect_wrapper(response, "recommendations")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Recommendation::from_raw)
            .collect()
    }
}
