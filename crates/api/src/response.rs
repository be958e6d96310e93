//! The consistent JSON response envelope.
//!
//! Every endpoint answers with the same shape:
//!
//! ```json
//! {
//!   "success": true,
//!   "status_code": 200,
//!   "message": "some message",
//!   "data": {},
//!   "errors": {},
//!   "meta": {}
//! }
//! ```
//!
//! `success` is derived from the status code; absent sections are omitted
//! rather than serialized as null.

use std::collections::BTreeMap;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

/// Builder for the standard response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: BTreeMap<String, Value>,
}

impl ApiResponse {
    fn new(status: StatusCode) -> Self {
        Self {
            success: status.is_success(),
            status_code: status.as_u16(),
            message: None,
            data: None,
            errors: None,
            meta: BTreeMap::new(),
        }
    }

    /// 200 with payload and message.
    pub fn success(data: impl Serialize, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK)
            .with_message(message)
            .with_data(data)
    }

    /// 201 with payload and message.
    pub fn created(data: impl Serialize, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED)
            .with_message(message)
            .with_data(data)
    }

    /// An error envelope with an arbitrary status.
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(status).with_message(message)
    }

    /// 422 carrying a field-keyed error map.
    pub fn validation_error(errors: impl Serialize) -> Self {
        let mut response =
            Self::new(StatusCode::UNPROCESSABLE_ENTITY).with_message("Validation failed");
        response.errors = serde_json::to_value(errors).ok();
        response
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: impl Serialize) -> Self {
        // A null payload is omitted rather than serialized as "data": null.
        self.data = match serde_json::to_value(data) {
            Ok(Value::Null) | Err(_) => None,
            Ok(value) => Some(value),
        };
        self
    }

    /// Attaches a meta entry such as `total_enrollments`.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.meta.insert(key.into(), value);
        }
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_carries_data_and_message() {
        let response = ApiResponse::success(serde_json::json!({"id": 1}), "Success");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["status_code"], 200);
        assert_eq!(json["data"]["id"], 1);
        assert_eq!(json["message"], "Success");
        assert!(json.get("errors").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn error_envelope_is_not_successful() {
        let response = ApiResponse::error(StatusCode::NOT_FOUND, "Course with ID 1 not found");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["status_code"], 404);
    }

    #[test]
    fn meta_entries_are_included_when_present() {
        let response = ApiResponse::success(Vec::<i32>::new(), "ok").with_meta("total", 3);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["meta"]["total"], 3);
    }

    #[test]
    fn validation_envelope_keeps_the_field_map() {
        let mut errors = domain::ValidationErrors::new();
        errors.add("title", "title is required");
        let response = ApiResponse::validation_error(&errors);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status_code"], 422);
        assert_eq!(json["errors"]["title"][0], "title is required");
    }
}
