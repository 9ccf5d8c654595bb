//! Records data model
//!
//! The two record kinds exchanged with the backend and their supporting types:
//!
//! - **report**: `IncidentReport` (a blotter entry) and its status vocabulary
//! - **document**: `DocumentRequest` and its status vocabulary
//! - **catalog**: the fixed catalog of document kinds and their extra fields
//! - **attachment**: attachment descriptors and URL resolution
//! - **tracking**: tracking number and pickup code generation
//! - **settings**: locally stored barangay settings
//!
//! Both record kinds implement [`Record`], which is what the repositories are
//! generic over.

mod attachment;
mod catalog;
mod document;
mod report;
mod settings;
pub mod tracking;

pub use attachment::Attachment;
pub use catalog::{DocumentType, FieldKind, FieldSpec};
pub use document::{DocumentPatch, DocumentRequest, DocumentStatus, NewDocumentRequest};
pub use report::{IncidentPatch, IncidentReport, IncidentStatus, NewIncidentReport};
pub use settings::BarangaySettings;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A record kind served by a REST resource and mirrored in the local store
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Creation payload
    type Draft: Clone + Serialize + Send + Sync + 'static;
    /// Partial update payload
    type Patch: Clone + Serialize + Send + Sync + 'static;

    /// Resource path segment on the backend (`/api/<RESOURCE>`)
    const RESOURCE: &'static str;
    /// Key of the JSON collection in the local store
    const STORAGE_KEY: &'static str;

    /// Record identifier
    fn id(&self) -> &str;

    /// Build a record from a draft without the backend.
    ///
    /// Used by the local store; every identifier it assigns is local-only.
    fn materialize(draft: Self::Draft, id: String, now: DateTime<Utc>) -> Self;

    /// Apply a partial update in place
    fn apply(&mut self, patch: &Self::Patch);
}

/// Identifier written either as a JSON string or as a number.
///
/// The legacy local log stored creation millis as bare numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Optional id that may be a string or a number
pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(raw.map(String::from))
}

/// Timestamp that tolerates the shapes records carry in practice.
///
/// Accepts RFC 3339, a zone-less `YYYY-MM-DDTHH:MM[:SS]`, a bare `YYYY-MM-DD`
/// (midnight UTC) or epoch millis. Anything else decodes as `None`.
pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(parse_timestamp))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let parsed = match value {
        Value::Null => return None,
        Value::String(text) if text.trim().is_empty() => return None,
        Value::String(text) => parse_timestamp_text(text.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    };
    if parsed.is_none() {
        tracing::debug!("Ignoring unreadable timestamp: {}", value);
    }
    parsed
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(text) {
        return Some(time.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&time));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|time| Utc.from_utc_datetime(&time))
}

/// Form fields as text, whatever scalar type the sender used.
///
/// Numbers and booleans keep their JSON spelling, nulls are dropped, and a
/// value that is not an object at all decodes as no fields.
pub(crate) fn text_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            tracing::debug!("Ignoring form fields that are not an object: {}", other);
            return Ok(BTreeMap::new());
        }
    };

    Ok(map
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name, text)),
            other => Some((name, other.to_string())),
        })
        .collect())
}
