//! Script resource: user scripts run against clusters after provisioning.

use std::sync::LazyLock;

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{expect_wrapper, LavaClient};
use crate::error::Result;
use crate::request::marshal;
use crate::schema::{FieldSpec, FieldType, FieldValue, ModelInstance, Schema};

/// Script types the API accepts.
pub const SCRIPT_TYPES: &[&str] = &["POST_INIT"];

pub static LINK: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Link")
        .field(FieldSpec::required("rel", FieldType::Text))
        .field(FieldSpec::required("href", FieldType::Text))
});

pub static SCRIPT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Script")
        .field(FieldSpec::required("id", FieldType::Text))
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::optional("type", FieldType::Text).choices(SCRIPT_TYPES))
        .field(FieldSpec::optional("is_public", FieldType::Bool))
        .field(FieldSpec::optional("created", FieldType::Timestamp))
        .field(FieldSpec::optional("updated", FieldType::Timestamp))
        .field(FieldSpec::optional("url", FieldType::Text))
        .field(FieldSpec::optional("links", FieldType::NestedList(&LINK)))
        .table(
            &["id", "name", "type", "is_public", "created", "url"],
            &["ID", "Name", "Type", "Public", "Created", "URL"],
        )
});

static SCRIPT_REQUEST: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("ScriptRequest")
        .field(FieldSpec::required("name", FieldType::Text))
        .field(FieldSpec::required("url", FieldType::Text))
        .field(FieldSpec::required("type", FieldType::Text).choices(SCRIPT_TYPES))
});

/// A post-install script registered with the tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct Script(ModelInstance);

impl Script {
    pub fn from_raw(raw: &Value) -> Result<Self> {
        SCRIPT.validate(raw).map(Self)
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
        SCRIPT
            .project(&self.0)
            .iter()
            .map(FieldValue::to_string)
            .collect()
    }

    #[must_use]
    pub fn table_header() -> &'static [&'static str] {
        SCRIPT.table_header
    }
}

impl Serialize for Script {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

/// Parameters for creating or updating a script.
#[derive(Debug, Clone)]
pub struct ScriptParams {
    pub name: String,
    pub url: String,
    pub script_type: String,
}

impl ScriptParams {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        script_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            script_type: script_type.into(),
        }
    }

    /// Marshal into the `{"script": {...}}` request envelope.
    pub fn into_body(self) -> Result<Value> {
        let params = json!({
            "name": self.name,
            "url": self.url,
            "type": self.script_type,
        });
        let body = marshal(&params, &SCRIPT_REQUEST)?;
        Ok(json!({ "script": body }))
    }
}

/// Handler for script operations.
pub struct ScriptHandler {
    client: LavaClient,
}

impl ScriptHandler {
    #[must_use]
    pub fn new(client: LavaClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Script>> {
        debug!("listing scripts");
        let response = self.client.get("scripts", &[]).await?;
        let raw = expect_wrapper(response, "scripts")?;
        raw.as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(Script::from_raw)
            .collect()
    }

    pub async fn create(&self, params: ScriptParams) -> Result<Script> {
        debug!(name = %params.name, "creating script");
        let body = params.into_body()?;
        let response = self.client.post("scripts", body).await?;
        Script::from_raw(&expect_wrapper(response, "script")?)
    }

    pub async fn update(&self, script_id: &str, params: ScriptParams) -> Result<Script> {
        debug!(script_id, "updating script");
        let body = params.into_body()?;
        let response = self.client.put(&format!("scripts/{script_id}"), body).await?;
        Script::from_raw(&expect_wrapper(response, "script")?)
    }

    pub async fn delete(&self, script_id: &str) -> Result<()> {
        debug!(script_id, "deleting script");
        self.client.delete(&format!("scripts/{script_id}")).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn fixture() -> Value {
        json!({
            "id": "script_id",
            "name": "bootstrap",
            "type": "POST_INIT",
            "is_public": false,
            "created": "2014-03-01T09:00:00",
            "updated": null,
            "url": "https://example.com/bootstrap.sh",
            "links": [{"rel": "self", "href": "https://example.com/scripts/script_id"}]
        })
    }

    #[test]
    fn parses_and_projects() {
        let script = Script::from_raw(&fixture()).unwrap();
        assert_eq!(script.id(), "script_id");
        assert_eq!(
            script.table_row(),
            vec![
                "script_id",
                "bootstrap",
                "POST_INIT",
                "false",
                "2014-03-01 09:00:00",
                "https://example.com/bootstrap.sh",
            ]
        );
    }

    #[test]
    fn rejects_unknown_script_type() {
        let mut raw = fixture();
        raw["type"] = json!("PRE_INIT");
        let err = Script::from_raw(&raw).unwrap_err();
        assert!(matches!(err, Error::InvalidChoice { field: "type", .. }));
    }

    #[test]
    fn params_marshal_into_envelope() {
        let body = ScriptParams::new("bootstrap", "https://example.com/b.sh", "POST_INIT")
            .into_body()
            .unwrap();
        assert_eq!(
            body,
            json!({
                "script": {
                    "name": "bootstrap",
                    "url": "https://example.com/b.sh",
                    "type": "POST_INIT"
                }
            })
        );
    }

    #[test]
    fn params_reject_bad_type_before_sending() {
        let err = ScriptParams::new("bootstrap", "https://example.com/b.sh", "WHENEVER")
            .into_body()
            .unwrap_err();
        assert!(matches!(err, Error::InvalidChoice { .. }));
    }
}
