//! Request-body marshaling.
//!
//! Outgoing bodies run through the same schema engine as responses: the
//! request schema validates and coerces the caller's parameters, drops any
//! keys the endpoint does not accept, and serializes back with unset
//! optional fields omitted.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::schema::Schema;

/// Validate `params` against `schema` and produce the JSON object to send.
///
/// Choice constraints are enforced here, before any bytes hit the wire, so
/// a bad `persistent` value fails locally instead of round-tripping for a
/// 400. Keys in `params` that the schema does not declare are stripped.
pub fn marshal(params: &Value, schema: &Schema) -> Result<Map<String, Value>> {
    let instance = schema.validate(params)?;
    Ok(instance.to_json_map(true))
}
