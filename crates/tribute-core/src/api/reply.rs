use serde_json::Value;

/// Status the backend uses for an accepted submission.
const STATUS_SUCCESS: &str = "success";

/// Status the backend uses for a confirmed deletion.
const STATUS_DELETED: &str = "deleted";

/// A backend reply body, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendReply {
    /// `{status: "success", id}`
    Created { id: String },
    /// `{status: "deleted"}`
    Deleted,
    /// Any other status, with the backend's `message` when it sent one.
    Rejected { reason: Option<String> },
    /// JSON, but not an envelope we understand.
    Unrecognized,
    /// Not JSON at all.
    NotJson,
}

impl BackendReply {
    pub fn classify(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => return BackendReply::NotJson,
        };

        let Some(status) = value.get("status").and_then(Value::as_str) else {
            return BackendReply::Unrecognized;
        };

        match status {
            STATUS_SUCCESS => match value.get("id").and_then(scalar_to_string) {
                Some(id) if !id.is_empty() => BackendReply::Created { id },
                _ => BackendReply::Unrecognized,
            },
            STATUS_DELETED => BackendReply::Deleted,
            _ => BackendReply::Rejected {
                reason: value
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
