//! User-facing messages for API failures

use api_client::{ApiError, StatusCode};
use serde_json::Value;

pub const SESSION_EXPIRED: &str = "Your session has expired. Please log in again.";

/// Turn an `ApiError` into a sentence fit for an end user.
pub fn describe(err: &ApiError) -> String {
    match err {
        ApiError::Status { status, body } => describe_status(*status, body),
        ApiError::Network(_) => "Could not reach the server. Check your connection and try again.".into(),
        ApiError::MissingField(field) => format!("{field}: this field is required"),
        ApiError::InvalidPath(_) | ApiError::Config(_) => format!("Client misconfigured: {err}"),
        ApiError::Decode(_) => "The server sent a response this client does not understand.".into(),
        ApiError::Session(e) => format!("Could not access the stored session: {e}"),
    }
}

fn describe_status(status: StatusCode, body: &Value) -> String {
    let detail = body.get("detail").and_then(Value::as_str);
    match status {
        StatusCode::UNAUTHORIZED => SESSION_EXPIRED.into(),
        StatusCode::FORBIDDEN => detail
            .unwrap_or("You are not allowed to do that.")
            .to_owned(),
        StatusCode::NOT_FOUND => detail.unwrap_or("Not found.").to_owned(),
        s if s.is_server_error() => "The server had a problem. Try again later.".into(),
        _ => detail
            .map(str::to_owned)
            .or_else(|| field_errors(body))
            .unwrap_or_else(|| format!("Request failed ({status}).")),
    }
}

/// Flatten `{"field": ["msg", ..]}` validation payloads to `field: msg` lines.
fn field_errors(body: &Value) -> Option<String> {
    let fields = body.as_object()?;
    let lines: Vec<String> = fields
        .iter()
        .flat_map(|(field, messages)| match messages {
            Value::Array(items) => items
                .iter()
                .map(|m| format!("{field}: {}", message_text(m)))
                .collect(),
            other => vec![format!("{field}: {}", message_text(other))],
        })
        .collect();
    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status(code: u16, body: Value) -> ApiError {
        ApiError::Status {
            status: StatusCode::from_u16(code).unwrap(),
            body,
        }
    }

    #[test]
    fn unauthorized_asks_to_log_in() {
        let msg = describe(&status(401, json!({"detail": "Given token not valid"})));
        assert_eq!(msg, SESSION_EXPIRED);
    }

    #[test]
    fn forbidden_prefers_server_detail() {
        let msg = describe(&status(
            403,
            json!({"detail": "Only the question author can accept an answer."}),
        ));
        assert_eq!(msg, "Only the question author can accept an answer.");
        assert_eq!(
            describe(&status(403, Value::Null)),
            "You are not allowed to do that."
        );
    }

    #[test]
    fn not_found() {
        assert_eq!(describe(&status(404, json!("<html>"))), "Not found.");
    }

    #[test]
    fn validation_errors_are_flattened() {
        let msg = describe(&status(
            400,
            json!({"title": ["This field may not be blank."], "tag_ids": ["Invalid pk \"9\"."]}),
        ));
        assert!(msg.contains("title: This field may not be blank."), "{msg}");
        assert!(msg.contains("tag_ids: Invalid pk \"9\"."), "{msg}");
    }

    #[test]
    fn bad_request_with_detail() {
        let msg = describe(&status(400, json!({"detail": "Vote value must be 1 or -1."})));
        assert_eq!(msg, "Vote value must be 1 or -1.");
    }

    #[test]
    fn server_errors_are_generic() {
        let msg = describe(&status(502, json!("<h1>Bad Gateway</h1>")));
        assert_eq!(msg, "The server had a problem. Try again later.");
    }

    #[test]
    fn missing_field_names_the_field() {
        assert_eq!(
            describe(&ApiError::MissingField("content")),
            "content: this field is required"
        );
    }
}
