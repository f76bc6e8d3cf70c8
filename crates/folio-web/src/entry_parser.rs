#![forbid(unsafe_code)]

//! JSON parser for intersection entries and mount lists sent by the
//! JavaScript host.
//!
//! An entry names the section it belongs to, the target id and the
//! observer's verdict:
//!
//! ```json
//! {"section":"projects","id":"p1","intersecting":true,"ratio":0.4}
//! ```
//!
//! The DOM names (`isIntersecting`, `intersectionRatio`) are accepted as
//! aliases so the host can forward entry fields without renaming them.
//! Ids are strings or non-negative integers; canonical decimal strings
//! (`"7"`, not `"007"`) read as numeric keys, matching `data-*` attribute
//! round trips.
//!
//! Entries for sections this page does not know return `Ok(None)` and are
//! skipped by [`parse_entries`].

use folio_reveal::{IntersectionEvent, TargetId};
use folio_sections::SectionKind;
use serde::Deserialize;
use serde_json::Value;

/// Errors from parsing host JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Id that is neither a string nor a non-negative integer.
    InvalidId(String),
}

impl core::fmt::Display for EntryParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::InvalidId(raw) => write!(f, "invalid target id: {raw}"),
        }
    }
}

impl std::error::Error for EntryParseError {}

/// An intersection report routed to a section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionEntry {
    pub section: SectionKind,
    pub event: IntersectionEvent,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    #[serde(default)]
    section: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, alias = "isIntersecting")]
    intersecting: Option<bool>,
    #[serde(default, alias = "intersectionRatio")]
    ratio: Option<f64>,
}

/// Parse a single entry object.
pub fn parse_entry(json: &str) -> Result<Option<SectionEntry>, EntryParseError> {
    let raw: RawEntry = serde_json::from_str(json).map_err(json_error)?;
    entry_from_raw(raw)
}

/// Entries parsed from one host batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEntries {
    /// Valid entries for known sections, in batch order.
    pub entries: Vec<SectionEntry>,
    /// Items that failed to parse, in batch order.
    pub rejected: Vec<EntryParseError>,
}

/// Parse one entry object or an array of them, in order. Entries for
/// unknown sections are dropped.
///
/// Only malformed JSON fails the whole call. A bad item is recorded in
/// [`ParsedEntries::rejected`] and does not affect its neighbours.
pub fn parse_entries(json: &str) -> Result<ParsedEntries, EntryParseError> {
    let value: Value = serde_json::from_str(json).map_err(json_error)?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    let mut parsed = ParsedEntries {
        entries: Vec::with_capacity(items.len()),
        rejected: Vec::new(),
    };
    for item in items {
        let outcome = serde_json::from_value::<RawEntry>(item)
            .map_err(json_error)
            .and_then(entry_from_raw);
        match outcome {
            Ok(Some(entry)) => parsed.entries.push(entry),
            Ok(None) => {}
            Err(err) => parsed.rejected.push(err),
        }
    }
    Ok(parsed)
}

/// Parse a JSON array of target ids, e.g. `["p1","p2"]` or `[1,2,3]`.
pub fn parse_id_list(json: &str) -> Result<Vec<TargetId>, EntryParseError> {
    let values: Vec<Value> = serde_json::from_str(json).map_err(json_error)?;
    values.iter().map(parse_id).collect()
}

/// Interpret one JSON id value.
pub fn parse_id(value: &Value) -> Result<TargetId, EntryParseError> {
    match value {
        Value::String(raw) => Ok(TargetId::from_attribute(raw)),
        Value::Number(n) => n
            .as_u64()
            .map(TargetId::Key)
            .ok_or_else(|| EntryParseError::InvalidId(n.to_string())),
        other => Err(EntryParseError::InvalidId(other.to_string())),
    }
}

fn entry_from_raw(raw: RawEntry) -> Result<Option<SectionEntry>, EntryParseError> {
    let section = raw
        .section
        .as_deref()
        .ok_or(EntryParseError::MissingField("section"))?;
    let Some(section) = SectionKind::from_name(section) else {
        return Ok(None);
    };
    let id = raw.id.as_ref().ok_or(EntryParseError::MissingField("id"))?;
    let is_intersecting = raw
        .intersecting
        .ok_or(EntryParseError::MissingField("intersecting"))?;
    Ok(Some(SectionEntry {
        section,
        event: IntersectionEvent {
            id: parse_id(id)?,
            is_intersecting,
            ratio: raw.ratio.unwrap_or(0.0),
        },
    }))
}

fn json_error(err: serde_json::Error) -> EntryParseError {
    EntryParseError::Json(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_entry() {
        let json = r#"{"section":"projects","id":"p1","intersecting":true,"ratio":0.4}"#;
        let entry = parse_entry(json).unwrap().unwrap();
        assert_eq!(entry.section, SectionKind::Projects);
        assert_eq!(entry.event, IntersectionEvent::entering("p1").with_ratio(0.4));
    }

    #[test]
    fn dom_field_names_accepted() {
        let entry = parse_entry(
            r#"{"section":"about","id":"about","isIntersecting":false,"intersectionRatio":0}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(entry.event, IntersectionEvent::leaving("about"));
    }

    #[test]
    fn numeric_ids() {
        let from_number = parse_entry(r#"{"section":"projects","id":3,"intersecting":true}"#)
            .unwrap()
            .unwrap();
        let from_string = parse_entry(r#"{"section":"projects","id":"3","intersecting":true}"#)
            .unwrap()
            .unwrap();
        assert_eq!(from_number.event.id, TargetId::Key(3));
        assert_eq!(from_string.event.id, TargetId::Key(3));
        assert_eq!(from_number.event.ratio, 0.0);
    }

    #[test]
    fn unknown_section_is_skipped() {
        assert_eq!(
            parse_entry(r#"{"section":"footer","id":"f","intersecting":true}"#),
            Ok(None)
        );
        let entries = parse_entries(
            r#"[{"section":"footer","id":"f","intersecting":true},
                {"section":"skills","id":"skills","intersecting":true}]"#,
        )
        .unwrap();
        assert_eq!(entries.entries.len(), 1);
        assert_eq!(entries.entries[0].section, SectionKind::Skills);
        assert!(entries.rejected.is_empty());
    }

    #[test]
    fn errors() {
        assert!(matches!(parse_entry("{"), Err(EntryParseError::Json(_))));
        assert_eq!(
            parse_entry(r#"{"id":"p1","intersecting":true}"#),
            Err(EntryParseError::MissingField("section"))
        );
        assert_eq!(
            parse_entry(r#"{"section":"projects","intersecting":true}"#),
            Err(EntryParseError::MissingField("id"))
        );
        assert_eq!(
            parse_entry(r#"{"section":"projects","id":"p1"}"#),
            Err(EntryParseError::MissingField("intersecting"))
        );
        assert_eq!(
            parse_entry(r#"{"section":"projects","id":-1,"intersecting":true}"#),
            Err(EntryParseError::InvalidId("-1".into()))
        );
        assert_eq!(
            parse_entry(r#"{"section":"projects","id":null,"intersecting":true}"#),
            Err(EntryParseError::MissingField("id"))
        );
    }

    #[test]
    fn id_lists() {
        assert_eq!(
            parse_id_list(r#"["p1", 2, "03"]"#).unwrap(),
            vec![TargetId::from("p1"), TargetId::Key(2), TargetId::from("03")]
        );
        assert_eq!(
            parse_id_list(r#"["007", "7", 7]"#).unwrap(),
            vec![
                TargetId::Name("007".into()),
                TargetId::Key(7),
                TargetId::Key(7)
            ]
        );
        assert!(matches!(
            parse_id_list(r#"[true]"#),
            Err(EntryParseError::InvalidId(_))
        ));
    }

    #[test]
    fn bad_item_does_not_sink_batch() {
        let parsed = parse_entries(
            r#"[{"section":"about","id":"about","intersecting":true},
                {"section":"about","id":true,"intersecting":true},
                {"section":"projects","intersecting":true},
                "garbage",
                {"section":"skills","id":"skills","isIntersecting":true}]"#,
        )
        .unwrap();
        let sections: Vec<SectionKind> = parsed.entries.iter().map(|e| e.section).collect();
        assert_eq!(sections, vec![SectionKind::About, SectionKind::Skills]);
        assert_eq!(parsed.rejected.len(), 3);
        assert_eq!(parsed.rejected[0], EntryParseError::InvalidId("true".into()));
        assert_eq!(parsed.rejected[1], EntryParseError::MissingField("id"));
        assert!(matches!(parsed.rejected[2], EntryParseError::Json(_)));
    }

    #[test]
    fn single_bad_object_is_rejected_not_fatal() {
        let parsed = parse_entries(r#"{"section":"skills"}"#).unwrap();
        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.rejected, vec![EntryParseError::MissingField("id")]);
        assert!(matches!(parse_entries("[{"), Err(EntryParseError::Json(_))));
    }
}
