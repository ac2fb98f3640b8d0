//! Flavor resource: the hardware profiles a node group can run on.

use std::sync::LazyLock;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::debug;

use crate::client::{expect_wrapper, LavaClient};
use crate::error::Result;
use crate::schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};

pub static FLAVOR: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Flavor")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("ram", FieldType::Int))
        .field(FieldSpec::optional("vcpus", FieldType::Int))
        .field(FieldSpec::optional("disk", FieldType::Int))
        .field(FieldSpec::optional("links", FieldType::Raw))
        .table(
            &["id", "name", "ram", "vcpus", "disk"],
            &["ID", "Name", "RAM", "VCPUs", "Disk"],
        )
});

/// A hardware flavor available to node groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Flavor(ModelInstance);

impl Flavor {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        FLAVOR.validate(raw).map(Self)
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
        FLAVOR
            .project(&self.0)
            .iter()
            .map(FieldValue::to_string)
            .collect()
    }

    #[must_use]
    pub fn table_header() -> &'static [&'static str] {
        FLAVOR.table_header
    }
}

impl Serialize for Flavor {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Handler for flavor operations.
pub struct FlavorHandler {
    client: LavaClient,
}

impl FlavorHandler {
    #[must_use]
    pub fn new(client: LavaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Flavor>> {
        debug!("listing flavors");
        let response = self.client.get("flavors", &[]).await?;
        let raw = expect_wrapper(response, "flavors")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Flavor::from_raw)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn table_row_projection() {
        let raw = json!({
            "id": "hadoop1-15",
            "name": "Medium Hadoop Instance",
            "ram": 15360,
            "vcpus": 4,
            "disk": 2500,
            "links": [{"rel": "self", "href": "https://example.com"}]
        });
        let flavor = Flavor::from_raw(&raw).unwrap();
        assert_eq!(
            flavor.table_row(),
            vec!["hadoop1-15", "Medium Hadoop Instance", "15360", "4", "2500"]
        );
    }

    #[test]
    fn absent_sizing_fields_render_empty() {
        let raw = json!({"id": "hadoop1-7", "name": "Small"});
        let flavor = Flavor::from_raw(&raw).unwrap();
        assert_eq!(flavor.table_row(), vec!["hadoop1-7", "Small", "", "", ""]);
    }
}
