//! Request validation helpers shared by the HTTP handlers.

use actix_web::HttpRequest;
use actix_web::error::JsonPayloadError;
use serde_json::json;

use crate::domain::Error;
use crate::domain::lists::ListId;

/// Machine-readable codes placed in `details.code` for request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidBody,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidBody => "invalid_body",
        }
    }
}

/// Wire name of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const LIST_ID: FieldName = FieldName::new("id");
pub(crate) const ITEM_INDEX: FieldName = FieldName::new("index");

pub(crate) fn missing_field_error(field: FieldName, message: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
        "field": field,
        "value": value,
        "code": ErrorCode::InvalidUuid.as_str(),
    }))
}

/// Parse the `{id}` path segment of a list route.
pub(crate) fn parse_list_id(raw: &str) -> Result<ListId, Error> {
    ListId::new(raw).map_err(|_| invalid_uuid_error(LIST_ID, raw))
}

/// Require the positional `index` of an item request body.
pub(crate) fn require_index(index: Option<i64>) -> Result<i64, Error> {
    index.ok_or_else(|| missing_field_error(ITEM_INDEX, "index is required"))
}

/// `JsonConfig` error handler turning body decoding failures into
/// `invalid_request` errors instead of actix's plain-text 400.
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = match &err {
        JsonPayloadError::ContentType => "expected an application/json body".to_owned(),
        JsonPayloadError::Deserialize(inner) => format!("invalid request body: {inner}"),
        other => format!("invalid request body: {other}"),
    };
    Error::invalid_request(message)
        .with_details(json!({ "code": ErrorCode::InvalidBody.as_str() }))
        .into()
}
