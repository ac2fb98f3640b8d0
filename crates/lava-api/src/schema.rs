//! Declarative schema validation and coercion.
//!
//! Response and request shapes are described by [`Schema`] values: an ordered
//! list of [`FieldSpec`]s plus optional table-projection metadata. Schemas are
//! built once per process in `LazyLock` statics and consumed by a single
//! generic validation routine, [`Schema::validate`], which turns raw JSON into
//! an immutable [`ModelInstance`].
//!
//! Unknown keys in the raw input are ignored so that the client keeps working
//! when the API grows new response fields.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};

use crate::attr::AttrPath;
use crate::error::{Error, Result};

/// The declared type of a single schema field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    /// UTF-8 text; numbers are coerced to their decimal representation.
    Text,
    /// Signed integer.
    Int,
    /// Double-precision float; integers widen.
    Float,
    /// Boolean.
    Bool,
    /// `None` or an ISO date (`YYYY-MM-DD`) / ISO 8601 date-time string.
    Timestamp,
    /// Opaque JSON carried through untouched (free-form mappings).
    Raw,
    /// A list of text values.
    TextList,
    /// A single nested object validated against another schema.
    Nested(&'static LazyLock<Schema>),
    /// A list of nested objects, each validated against another schema.
    NestedList(&'static LazyLock<Schema>),
}

impl FieldType {
    fn expected(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Int => "integer",
            FieldType::Float => "float",
            FieldType::Bool => "boolean",
            FieldType::Timestamp => "timestamp",
            FieldType::Raw => "raw value",
            FieldType::TextList => "list of text",
            FieldType::Nested(_) => "object",
            FieldType::NestedList(_) => "list of objects",
        }
    }
}

/// One field's validation and coercion rule within a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub default: Option<FieldValue>,
    pub choices: Option<&'static [&'static str]>,
}

impl FieldSpec {
    /// A field that must be present in the raw input.
    #[must_use]
    pub fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            choices: None,
        }
    }

    /// A field that may be absent; validation fills in `default` or Null.
    #[must_use]
    pub fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: None,
            choices: None,
        }
    }

    /// Value used when the field is absent from the input.
    #[must_use]
    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict the coerced value to an enumerated set.
    #[must_use]
    pub fn choices(mut self, allowed: &'static [&'static str]) -> Self {
        self.choices = Some(allowed);
        self
    }
}

/// An ordered set of field specs describing one response or request shape,
/// plus optional table projection metadata.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    fields: Vec<FieldSpec>,
    pub table_columns: &'static [&'static str],
    pub table_header: &'static [&'static str],
}

impl Schema {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            table_columns: &[],
            table_header: &[],
        }
    }

    #[must_use]
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Table projection metadata. `columns` and `header` are parallel
    /// sequences of the same length.
    #[must_use]
    pub fn table(
        mut self,
        columns: &'static [&'static str],
        header: &'static [&'static str],
    ) -> Self {
        debug_assert_eq!(columns.len(), header.len());
        self.table_columns = columns;
        self.table_header = header;
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate raw JSON against this schema, producing a typed instance.
    ///
    /// Keys in `raw` that no field spec names are ignored.
    pub fn validate(&self, raw: &Value) -> Result<ModelInstance> {
        let map = raw.as_object().ok_or_else(|| Error::TypeCoercion {
            field: self.name.to_string(),
            expected: "object",
            got: json_kind(raw).to_string(),
        })?;

        let mut values = Vec::with_capacity(self.fields.len());
        for spec in &self.fields {
            let value = match map.get(spec.name) {
                // JSON null on a timestamp field is a legitimate "never
                // happened" marker; elsewhere null counts as absent.
                Some(Value::Null) if matches!(spec.ty, FieldType::Timestamp) => FieldValue::Null,
                Some(raw_value) if !raw_value.is_null() => {
                    let coerced = coerce(spec.name, &spec.ty, raw_value)?;
                    if let Some(allowed) = spec.choices {
                        check_choice(spec.name, &coerced, allowed)?;
                    }
                    coerced
                }
                _ if spec.required => {
                    return Err(Error::MissingField {
                        schema: self.name,
                        field: spec.name,
                    });
                }
                _ => spec.default.clone().unwrap_or(FieldValue::Null),
            };
            values.push((spec.name, value));
        }

        Ok(ModelInstance {
            schema: self.name,
            values,
        })
    }

    /// Project an instance onto this schema's table columns.
    ///
    /// Column names may be dotted paths into nested instances; a path that
    /// cannot be resolved projects as [`FieldValue::Null`] rather than
    /// failing the whole row.
    #[must_use]
    pub fn project(&self, instance: &ModelInstance) -> Vec<FieldValue> {
        self.table_columns
            .iter()
            .map(|column| {
                AttrPath::parse(column)
                    .resolve(instance)
                    .cloned()
                    .unwrap_or(FieldValue::Null)
            })
            .collect()
    }
}

/// A validated, coerced field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Raw(Value),
    List(Vec<FieldValue>),
    Model(ModelInstance),
}

impl FieldValue {
    /// JSON round-trip used by serialization and request marshaling.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Timestamp(ts) => {
                Value::String(ts.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            FieldValue::Raw(v) => v.clone(),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            FieldValue::Model(inst) => Value::Object(inst.to_json_map(false)),
        }
    }
}

/// Table-cell rendering. Nested models render as `{k=v,...}`, lists as
/// `[a,b]`, and Null as the empty string.
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{v:.1}")
                } else {
                    write!(f, "{v}")
                }
            }
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Raw(v) => f.write_str(&render_raw(v)),
            FieldValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            FieldValue::Model(inst) => f.write_str(&inst.summary()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            FieldValue::Null => serializer.serialize_unit(),
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Int(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Timestamp(ts) => {
                serializer.serialize_str(&ts.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            FieldValue::Raw(v) => v.serialize(serializer),
            FieldValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            FieldValue::Model(inst) => inst.serialize(serializer),
        }
    }
}

/// The validated result of applying a [`Schema`] to raw input.
///
/// Immutable after construction; field order follows the schema. Nested
/// instances are exclusively owned, forming a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    schema: &'static str,
    values: Vec<(&'static str, FieldValue)>,
}

impl ModelInstance {
    /// The name of the schema this instance was validated against.
    #[must_use]
    pub fn schema(&self) -> &'static str {
        self.schema
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FieldValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name) {
            Some(FieldValue::Int(i)) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(FieldValue::Float(f)) => Some(*f),
            Some(FieldValue::Int(i)) => Some(*i as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn timestamp(&self, name: &str) -> Option<NaiveDateTime> {
        match self.get(name) {
            Some(FieldValue::Timestamp(ts)) => Some(*ts),
            _ => None,
        }
    }

    /// Nested instances of a list field, empty when absent.
    #[must_use]
    pub fn models(&self, name: &str) -> Vec<&ModelInstance> {
        match self.get(name) {
            Some(FieldValue::List(items)) => items
                .iter()
                .filter_map(|item| match item {
                    FieldValue::Model(inst) => Some(inst),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// `{k=v,...}` rendering of non-null fields, used for table cells that
    /// summarize an owned collection.
    #[must_use]
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .values
            .iter()
            .filter(|(_, value)| !matches!(value, FieldValue::Null))
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        format!("{{{}}}", parts.join(","))
    }

    /// Serialize back to a JSON object; with `skip_null` set, absent
    /// optional fields are omitted rather than emitted as null.
    #[must_use]
    pub fn to_json_map(&self, skip_null: bool) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, value) in &self.values {
            if skip_null && matches!(value, FieldValue::Null) {
                continue;
            }
            let json = match value {
                FieldValue::Model(inst) => Value::Object(inst.to_json_map(skip_null)),
                FieldValue::List(items) => Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            FieldValue::Model(inst) => Value::Object(inst.to_json_map(skip_null)),
                            other => other.to_json(),
                        })
                        .collect(),
                ),
                other => other.to_json(),
            };
            map.insert((*name).to_string(), json);
        }
        map
    }
}

impl Serialize for ModelInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

fn coerce(field: &'static str, ty: &FieldType, raw: &Value) -> Result<FieldValue> {
    let fail = || Error::TypeCoercion {
        field: field.to_string(),
        expected: ty.expected(),
        got: json_kind(raw).to_string(),
    };

    match ty {
        FieldType::Text => match raw {
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
            _ => Err(fail()),
        },
        FieldType::Int => match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Int(i))
                } else {
                    match n.as_f64() {
                        Some(f) if f.fract() == 0.0 => Ok(FieldValue::Int(f as i64)),
                        _ => Err(fail()),
                    }
                }
            }
            Value::String(s) => s.parse().map(FieldValue::Int).map_err(|_| fail()),
            _ => Err(fail()),
        },
        FieldType::Float => match raw {
            Value::Number(n) => n.as_f64().map(FieldValue::Float).ok_or_else(fail),
            Value::String(s) => s.parse().map(FieldValue::Float).map_err(|_| fail()),
            _ => Err(fail()),
        },
        FieldType::Bool => match raw {
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            _ => Err(fail()),
        },
        FieldType::Timestamp => match raw {
            Value::String(s) => parse_timestamp(s).map(FieldValue::Timestamp).ok_or_else(fail),
            _ => Err(fail()),
        },
        FieldType::Raw => Ok(FieldValue::Raw(raw.clone())),
        FieldType::TextList => match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| coerce(field, &FieldType::Text, item))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            _ => Err(fail()),
        },
        FieldType::Nested(schema) => match raw {
            Value::Object(_) => schema.validate(raw).map(FieldValue::Model),
            _ => Err(fail()),
        },
        FieldType::NestedList(schema) => match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| schema.validate(item).map(FieldValue::Model))
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            _ => Err(fail()),
        },
    }
}

fn check_choice(
    field: &'static str,
    value: &FieldValue,
    allowed: &'static [&'static str],
) -> Result<()> {
    let text = match value {
        FieldValue::Text(s) => s.as_str(),
        _ => return Ok(()),
    };
    if allowed.contains(&text) {
        Ok(())
    } else {
        Err(Error::InvalidChoice {
            field,
            value: text.to_string(),
            allowed,
        })
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `{k=v,...}` rendering of opaque JSON carried through Raw fields.
fn render_raw(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(render_raw).collect();
            format!("[{}]", parts.join(","))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{k}={}", render_raw(v)))
                .collect();
            format!("{{{}}}", parts.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    static SIZE: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new("Size")
            .field(FieldSpec::required("flavor", FieldType::Text))
            .field(FieldSpec::required("minutes", FieldType::Float))
            .field(FieldSpec::required("nodecount", FieldType::Int))
            .field(
                FieldSpec::optional("recommended", FieldType::Bool)
                    .default_value(FieldValue::Bool(false)),
            )
    });

    static REC: LazyLock<Schema> = LazyLock::new(|| {
        Schema::new("Recommendation")
            .field(FieldSpec::required("name", FieldType::Text))
            .field(FieldSpec::required("requires", FieldType::TextList))
            .field(FieldSpec::required("sizes", FieldType::NestedList(&SIZE)))
            .field(
                FieldSpec::optional("persistent", FieldType::Text)
                    .choices(&["all", "none", "data"]),
            )
            .field(FieldSpec::optional("updated", FieldType::Timestamp))
            .table(
                &["name", "persistent", "sizes"],
                &["Name", "Persistence", "Sizes"],
            )
    });

    fn sample() -> Value {
        json!({
            "name": "hadoop",
            "requires": ["disk"],
            "sizes": [{"flavor": "hadoop1-7", "minutes": 60.0, "nodecount": 3}],
            "persistent": "data",
            "updated": "2014-06-01T12:30:00",
            "extra_key_from_future_api": 42
        })
    }

    #[test]
    fn validates_and_coerces_round_trip() {
        let inst = REC.validate(&sample()).unwrap();
        assert_eq!(inst.text("name"), Some("hadoop"));
        assert_eq!(inst.text("persistent"), Some("data"));
        assert_eq!(
            inst.timestamp("updated"),
            NaiveDate::from_ymd_opt(2014, 6, 1)
                .unwrap()
                .and_hms_opt(12, 30, 0)
        );

        let sizes = inst.models("sizes");
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].float("minutes"), Some(60.0));
        assert_eq!(sizes[0].int("nodecount"), Some(3));
        // default applied
        assert_eq!(sizes[0].boolean("recommended"), Some(false));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        // sample() carries a key no spec names; validation must not fail
        // and the key must not leak into the instance.
        let inst = REC.validate(&sample()).unwrap();
        assert!(inst.get("extra_key_from_future_api").is_none());
    }

    #[test]
    fn missing_required_field_names_the_field() {
        let raw = json!({"requires": [], "sizes": []});
        match REC.validate(&raw) {
            Err(Error::MissingField { schema, field }) => {
                assert_eq!(schema, "Recommendation");
                assert_eq!(field, "name");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn invalid_choice_is_rejected() {
        let mut raw = sample();
        raw["persistent"] = json!("sometimes");
        match REC.validate(&raw) {
            Err(Error::InvalidChoice { field, value, .. }) => {
                assert_eq!(field, "persistent");
                assert_eq!(value, "sometimes");
            }
            other => panic!("expected InvalidChoice, got {other:?}"),
        }
    }

    #[test]
    fn type_coercion_failure_is_reported() {
        let mut raw = sample();
        raw["sizes"] = json!([{"flavor": "x", "minutes": "not-a-number", "nodecount": 1}]);
        match REC.validate(&raw) {
            Err(Error::TypeCoercion { field, .. }) => assert_eq!(field, "minutes"),
            other => panic!("expected TypeCoercion, got {other:?}"),
        }
    }

    #[test]
    fn timestamp_accepts_null_date_and_datetime() {
        let mut raw = sample();
        raw["updated"] = json!(null);
        let inst = REC.validate(&raw).unwrap();
        assert_eq!(inst.get("updated"), Some(&FieldValue::Null));

        raw["updated"] = json!("2014-01-01");
        let inst = REC.validate(&raw).unwrap();
        assert_eq!(
            inst.timestamp("updated"),
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap().and_hms_opt(0, 0, 0)
        );

        raw["updated"] = json!("2014-01-01T06:00:00Z");
        let inst = REC.validate(&raw).unwrap();
        assert_eq!(
            inst.timestamp("updated"),
            NaiveDate::from_ymd_opt(2014, 1, 1).unwrap().and_hms_opt(6, 0, 0)
        );

        raw["updated"] = json!("January 1st");
        assert!(matches!(
            REC.validate(&raw),
            Err(Error::TypeCoercion { .. })
        ));
    }

    #[test]
    fn numbers_coerce_to_text() {
        static IDS: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new("Ids").field(FieldSpec::required("id", FieldType::Text))
        });
        let inst = IDS.validate(&json!({"id": 17})).unwrap();
        assert_eq!(inst.text("id"), Some("17"));
    }

    #[test]
    fn projection_is_idempotent_and_resolves_nulls() {
        let inst = REC.validate(&sample()).unwrap();
        let first = REC.project(&inst);
        let second = REC.project(&inst);
        assert_eq!(first, second);
        assert_eq!(first.len(), REC.table_header.len());
        assert_eq!(first[0], FieldValue::Text("hadoop".to_string()));

        // A column missing from the instance projects as Null, not a panic.
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("persistent");
        let inst = REC.validate(&raw).unwrap();
        assert_eq!(REC.project(&inst)[1], FieldValue::Null);
    }

    #[test]
    fn display_renders_collection_summaries() {
        let inst = REC.validate(&sample()).unwrap();
        let sizes = inst.get("sizes").unwrap();
        assert_eq!(
            sizes.to_string(),
            "[{flavor=hadoop1-7,minutes=60.0,nodecount=3,recommended=false}]"
        );
        assert_eq!(FieldValue::List(Vec::new()).to_string(), "[]");
        assert_eq!(FieldValue::Null.to_string(), "");
    }

    #[test]
    fn to_json_map_skips_absent_optionals() {
        let mut raw = sample();
        raw.as_object_mut().unwrap().remove("persistent");
        raw["updated"] = json!(null);
        let inst = REC.validate(&raw).unwrap();
        let map = inst.to_json_map(true);
        assert!(!map.contains_key("persistent"));
        assert!(!map.contains_key("updated"));
        assert!(map.contains_key("name"));
    }
}
