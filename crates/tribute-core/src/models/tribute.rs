use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::identity::OwnerToken;

/// Author shown when the name field is left blank.
pub const DEFAULT_NAME: &str = "Anonymous";

/// Relation shown when the relation field is left blank.
pub const DEFAULT_RELATION: &str = "Friend";

/// Minimum message length, in characters, after trimming.
pub const MIN_MESSAGE_LENGTH: usize = 10;

/// Number of tributes shown in the short preview list.
pub const PREVIEW_COUNT: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please write a meaningful tribute (at least {min} characters, got {actual})")]
    MessageTooShort { min: usize, actual: usize },
}

/// A single guestbook entry as stored by the backend and the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct TributeRecord {
    #[serde(deserialize_with = "de_identifier")]
    pub id: String,
    #[serde(default = "default_name", deserialize_with = "de_name")]
    pub name: String,
    #[serde(default = "default_relation", deserialize_with = "de_relation")]
    pub relation: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub message: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "number"))]
    pub ts: i64,
    /// Owner token of the client that submitted this tribute
    #[serde(default, rename = "uuid", deserialize_with = "de_opt_string")]
    pub owner: String,
}

impl TributeRecord {
    /// Build the cached record for a draft the backend accepted under `id`.
    pub fn from_draft(id: String, draft: &TributeDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            relation: draft.relation.clone(),
            message: draft.message.clone(),
            ts: draft.ts,
            owner: draft.owner.as_str().to_string(),
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.ts)
    }

    /// "Name (Relation)" heading used by list views
    pub fn heading(&self) -> String {
        format!("{} ({})", self.name, self.relation)
    }
}

/// A validated tribute that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TributeDraft {
    pub name: String,
    pub relation: String,
    pub message: String,
    pub owner: OwnerToken,
    pub ts: i64,
}

impl TributeDraft {
    /// Trim and default the form fields, rejecting short messages.
    pub fn new(
        name: &str,
        relation: &str,
        message: &str,
        owner: OwnerToken,
        ts: i64,
    ) -> Result<Self, ValidationError> {
        let message = message.trim();
        let length = message.chars().count();
        if length < MIN_MESSAGE_LENGTH {
            return Err(ValidationError::MessageTooShort {
                min: MIN_MESSAGE_LENGTH,
                actual: length,
            });
        }

        Ok(Self {
            name: or_default(name, DEFAULT_NAME),
            relation: or_default(relation, DEFAULT_RELATION),
            message: message.to_string(),
            owner,
            ts,
        })
    }

    /// Form fields sent to the backend on create.
    pub fn form_fields(&self) -> [(&'static str, String); 5] {
        [
            ("name", self.name.clone()),
            ("relation", self.relation.clone()),
            ("message", self.message.clone()),
            ("uuid", self.owner.as_str().to_string()),
            ("ts", self.ts.to_string()),
        ]
    }
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Records in display order, most recent arrival first.
pub fn newest_first(records: &[TributeRecord]) -> Vec<&TributeRecord> {
    records.iter().rev().collect()
}

/// The `count` most recent arrivals, newest first.
pub fn latest(records: &[TributeRecord], count: usize) -> Vec<&TributeRecord> {
    records.iter().rev().take(count).collect()
}

// ============================================================================
// Lenient field parsing
// ============================================================================
//
// The backend is a spreadsheet-backed script, so cells come back as whatever
// JSON type the sheet inferred.

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => match whole_i64(f) {
                Some(n) => n.to_string(),
                None => f.to_string(),
            },
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// `f` as an i64 when it is a whole number inside the i64 range.
fn whole_i64(f: f64) -> Option<i64> {
    // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_relation() -> String {
    DEFAULT_RELATION.to_string()
}

fn de_identifier<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.into_string())
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_string)
        .unwrap_or_default())
}

fn de_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(or_default(&de_opt_string(deserializer)?, DEFAULT_NAME))
}

fn de_relation<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(or_default(&de_opt_string(deserializer)?, DEFAULT_RELATION))
}

fn de_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(match Option::<Scalar>::deserialize(deserializer)? {
        Some(Scalar::Int(n)) => n,
        Some(Scalar::Float(f)) => whole_i64(f).unwrap_or(0),
        Some(Scalar::Str(s)) => parse_timestamp(&s),
        Some(Scalar::Bool(_)) | None => 0,
    })
}

/// Millisecond timestamp from a numeric or RFC 3339 string; 0 when neither.
fn parse_timestamp(s: &str) -> i64 {
    let s = s.trim();
    if let Ok(ms) = s.parse::<i64>() {
        return ms;
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> OwnerToken {
        OwnerToken::from("owner-1")
    }

    #[test]
    fn test_draft_defaults_blank_fields() {
        let draft = TributeDraft::new("  ", "", "  hello world!  ", token(), 1000)
            .expect("valid draft");
        assert_eq!(draft.name, "Anonymous");
        assert_eq!(draft.relation, "Friend");
        assert_eq!(draft.message, "hello world!");
    }

    #[test]
    fn test_draft_rejects_short_message_after_trim() {
        let err = TributeDraft::new("A", "B", "   short    ", token(), 0).unwrap_err();
        assert_eq!(err, ValidationError::MessageTooShort { min: 10, actual: 5 });

        // Exactly 10 characters passes
        assert!(TributeDraft::new("", "", "0123456789", token(), 0).is_ok());
    }

    #[test]
    fn test_draft_counts_characters_not_bytes() {
        // 10 characters, 20 bytes
        let msg = "éééééééééé";
        assert!(TributeDraft::new("", "", msg, token(), 0).is_ok());
    }

    #[test]
    fn test_form_fields() {
        let draft = TributeDraft::new("Ann", "Sister", "We miss you dearly", token(), 42).unwrap();
        let fields = draft.form_fields();
        assert_eq!(fields[0], ("name", "Ann".to_string()));
        assert_eq!(fields[3], ("uuid", "owner-1".to_string()));
        assert_eq!(fields[4], ("ts", "42".to_string()));
    }

    #[test]
    fn test_parse_backend_record() {
        let json = r#"{"id":"1","name":"A","relation":"Friend","message":"hello world!","ts":1000,"uuid":"x"}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "1");
        assert_eq!(record.owner, "x");
        assert_eq!(record.ts, 1000);
    }

    #[test]
    fn test_parse_lenient_record() {
        let json = r#"{"id":17,"name":"","message":"hello world!","ts":"2024-03-01T12:00:00Z"}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "17");
        assert_eq!(record.name, "Anonymous");
        assert_eq!(record.relation, "Friend");
        assert_eq!(record.owner, "");
        assert_eq!(record.ts, 1_709_294_400_000);

        let json = r#"{"id":"9","message":"hello world!","ts":"1700000000000","uuid":null}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.ts, 1_700_000_000_000);
    }

    #[test]
    fn test_parse_non_string_message() {
        let json = r#"{"id":"1","message":1234567890,"ts":1000,"uuid":"x"}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.message, "1234567890");

        let json = r#"{"id":"2","message":null,"ts":1000}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.message, "");
    }

    #[test]
    fn test_parse_large_float_keeps_text() {
        let json = r#"{"id":1e20,"message":"hello world!","ts":1.5e20}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "100000000000000000000");
        assert_eq!(record.ts, 0);

        let json = r#"{"id":42.0,"message":"hello world!","ts":1000.0}"#;
        let record: TributeRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.ts, 1000);
    }

    #[test]
    fn test_record_serializes_with_wire_keys() {
        let draft = TributeDraft::new("Ann", "", "We miss you dearly", token(), 5).unwrap();
        let record = TributeRecord::from_draft("abc".to_string(), &draft);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["uuid"], "owner-1");
        assert_eq!(value["relation"], "Friend");
        assert_eq!(value["id"], "abc");
    }

    #[test]
    fn test_latest_is_newest_first() {
        let records: Vec<TributeRecord> = (0..6)
            .map(|i| TributeRecord {
                id: i.to_string(),
                name: DEFAULT_NAME.to_string(),
                relation: DEFAULT_RELATION.to_string(),
                message: "hello world!".to_string(),
                ts: i,
                owner: String::new(),
            })
            .collect();

        let ids: Vec<&str> = latest(&records, PREVIEW_COUNT).iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["5", "4", "3", "2"]);
        assert_eq!(newest_first(&records).len(), 6);
        assert_eq!(newest_first(&records)[0].id, "5");
    }
}
