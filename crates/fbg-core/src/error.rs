//! Error types for materialization, dispatch and connection loading.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// HTTP failure details reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorInfo {
    /// Error message.
    pub message: String,
    /// HTTP status code (if available).
    pub status_code: Option<u16>,
    /// Whether the error was a timeout.
    pub is_timeout: bool,
    /// Whether the error was a connection failure.
    pub is_connect: bool,
}

/// Failure raised by a [`GraphTransport`](crate::GraphTransport) implementation.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// HTTP/network error.
    #[error("HTTP error: {0:?}")]
    Http(HttpErrorInfo),

    /// Non-success status whose body was not a JSON document.
    #[error("HTTP status {status} with body: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated if needed).
        body: String,
    },

    /// Body could not be parsed as JSON.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Category of an error object returned by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServerErrorKind {
    /// `OAuthException`: the access token was rejected or lacks a permission.
    OAuth,
    /// `InvalidSessionException`: the session token is missing or expired.
    InvalidSession,
    /// `GraphMethodException`: the requested method is not supported.
    GraphMethod,
    /// `UnmatchedTypeDefinitionException`.
    UnmatchedTypeDefinition,
    /// Any type string the client does not recognise.
    Generic,
}

impl ServerErrorKind {
    /// Map the server's `type` string onto a known kind.
    #[must_use]
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "OAuthException" => Self::OAuth,
            "InvalidSessionException" => Self::InvalidSession,
            "GraphMethodException" => Self::GraphMethod,
            "UnmatchedTypeDefinitionException" => Self::UnmatchedTypeDefinition,
            _ => Self::Generic,
        }
    }

    /// Whether the failure is an authorization problem.
    #[must_use]
    pub const fn is_auth(self) -> bool {
        matches!(self, Self::OAuth | Self::InvalidSession)
    }
}

/// Error object embedded in a response body as `{"error": {"type", "message"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerError {
    /// Kind selected from `error_type`.
    pub kind: ServerErrorKind,
    /// Raw `type` string as sent by the server.
    pub error_type: String,
    /// Human-readable message.
    pub message: String,
    /// Numeric error code, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
}

impl ServerError {
    /// Parse the `error` node of a response.
    #[must_use]
    pub fn from_node(node: &Value) -> Self {
        let error_type = node
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let message = node
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| "unspecified server error".to_string(), str::to_string);
        Self {
            kind: ServerErrorKind::from_type_name(&error_type),
            error_type,
            message,
            code: node.get("code").and_then(Value::as_i64),
        }
    }

    /// Return the server error carried by `body`, if it has an `error` object.
    #[must_use]
    pub fn detect(body: &Value) -> Option<Self> {
        body.as_object()
            .and_then(|map| map.get("error"))
            .filter(|node| !node.is_null())
            .map(Self::from_node)
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.error_type.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.error_type, self.message)
        }
    }
}

/// Error type for all engine operations.
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// The response body carried an error object.
    #[error("server error: {0}")]
    ServerReported(ServerError),

    /// A required scalar could not be coerced from the JSON node found.
    #[error("field `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Source path of the field.
        path: String,
        /// Target type name.
        expected: &'static str,
        /// JSON shape that was found.
        found: String,
    },

    /// A non-nullable date field was missing or unparsable.
    #[error("field `{path}`: cannot parse {value:?} as a date/time")]
    DateParse {
        /// Source path of the field.
        path: String,
        /// The raw text, `None` when the value was absent.
        value: Option<String>,
    },

    /// Polymorphic dispatch got a tag with no registered type.
    #[error("unmatched type definition: {0}")]
    UnmatchedTypeDefinition(String),

    /// A type's field table is malformed. Raised on first use, never retried.
    #[error("cannot build mapper for `{type_name}`: {reason}")]
    MapperBuild {
        /// Rust type name.
        type_name: &'static str,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// A connection was requested for an entity without an id.
    #[error("connection `{relation}` requires a source entity id")]
    MissingSourceId {
        /// Relation name.
        relation: String,
    },

    /// A URL could not be built or parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The entity has no id or session to re-request itself with.
    #[error("entity is detached: {0}")]
    DetachedEntity(String),

    /// Session configuration is unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The transport failed before a body was obtained.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<ServerError> for GraphError {
    fn from(err: ServerError) -> Self {
        Self::ServerReported(err)
    }
}

impl GraphError {
    /// The server error, if this failure was reported by the remote API.
    #[must_use]
    pub const fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::ServerReported(err) => Some(err),
            _ => None,
        }
    }

    /// The field path involved in a coercion failure.
    #[must_use]
    pub fn field_path(&self) -> Option<&str> {
        match self {
            Self::TypeMismatch { path, .. } | Self::DateParse { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Whether the failure is an authorization problem reported by the server.
    #[must_use]
    pub fn is_auth_error(&self) -> bool {
        self.server_error().is_some_and(|err| err.kind.is_auth())
    }
}

/// Result type for engine operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Describe a JSON node's shape for error messages.
pub(crate) fn describe_node(node: &Value) -> String {
    match node {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {b}"),
        Value::Number(n) => format!("number {n}"),
        Value::String(s) => format!("string {s:?}"),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn known_error_types_map_to_kinds() {
        let err = ServerError::from_node(&json!({
            "type": "OAuthException",
            "message": "Error validating access token",
            "code": 190
        }));
        assert_eq!(err.kind, ServerErrorKind::OAuth);
        assert_eq!(err.code, Some(190));
        assert!(GraphError::from(err).is_auth_error());

        let err = ServerError::from_node(&json!({"type": "GraphMethodException", "message": "x"}));
        assert_eq!(err.kind, ServerErrorKind::GraphMethod);
    }

    #[test]
    fn unknown_type_falls_back_to_generic() {
        let err = ServerError::from_node(&json!({"type": "WeirdException", "message": "boom"}));
        assert_eq!(err.kind, ServerErrorKind::Generic);
        assert_eq!(err.error_type, "WeirdException");
        assert_eq!(err.to_string(), "WeirdException: boom");
    }

    #[test]
    fn detect_only_fires_on_error_objects() {
        assert!(ServerError::detect(&json!({"id": "1"})).is_none());
        assert!(ServerError::detect(&json!({"error": null})).is_none());
        assert!(ServerError::detect(&json!([{"error": {}}])).is_none());
        let err = ServerError::detect(&json!({"error": {"message": "nope"}})).unwrap();
        assert_eq!(err.message, "nope");
        assert_eq!(err.kind, ServerErrorKind::Generic);
    }

    #[test]
    fn field_path_is_exposed_for_coercion_errors() {
        let err = GraphError::DateParse {
            path: "start_time".into(),
            value: Some("soon".into()),
        };
        assert_eq!(err.field_path(), Some("start_time"));
        assert!(err.to_string().contains("start_time"));
        assert!(GraphError::InvalidUrl("x".into()).field_path().is_none());
    }
}
