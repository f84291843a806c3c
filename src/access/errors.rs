use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum AccessError {
    #[error("Failed to load policy file `{path}`")]
    #[diagnostic(
        code(sitegate::access::policy_load),
        help("Check that the file exists and contains valid KDL syntax")
    )]
    PolicyLoadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(sitegate::access::invalid_policy),
        help("Each policy file may contain `site`, `group` and `member` KDL nodes")
    )]
    InvalidPolicy(String),

    #[error("Invalid {field} mode `{value}`")]
    #[diagnostic(
        code(sitegate::access::invalid_mode),
        help("Expected one of: {expected}")
    )]
    InvalidMode {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Undefined group `{0}`")]
    #[diagnostic(
        code(sitegate::access::undefined_group),
        help("Declare the group with: group \"<name>\" {{ permissions {{ ... }} }}")
    )]
    UndefinedGroup(String),

    #[error("Site `{0}` is defined more than once")]
    #[diagnostic(
        code(sitegate::access::duplicate_site),
        help("Each site id may appear in only one `site` node across all policy files")
    )]
    DuplicateSite(String),

    #[error("Unknown member `{0}`")]
    #[diagnostic(code(sitegate::access::unknown_member))]
    UnknownMember(String),

    #[error("Invalid capability `{0}`")]
    #[diagnostic(
        code(sitegate::access::invalid_capability),
        help("Supported capabilities: view, edit, create_top_level")
    )]
    InvalidCapability(String),

    #[error("Invalid request: {0}")]
    #[diagnostic(code(sitegate::access::invalid_request))]
    InvalidRequest(String),

    #[error("Site `{site}` uses theme `{theme}`, which is not available")]
    #[diagnostic(
        code(sitegate::access::unavailable_theme),
        help("Install the theme, remove it from the disabled list, or pick another theme for the site")
    )]
    UnavailableTheme { site: String, theme: String },

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(sitegate::access::kdl_parse),
        help("Check your KDL file syntax, see https://kdl.dev for the specification")
    )]
    KdlParse(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(sitegate::access::io))]
    Io(#[from] std::io::Error),
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = match &self {
            AccessError::InvalidPolicy(_)
            | AccessError::InvalidMode { .. }
            | AccessError::InvalidCapability(_)
            | AccessError::InvalidRequest(_)
            | AccessError::UnavailableTheme { .. } => StatusCode::BAD_REQUEST,
            AccessError::UnknownMember(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}
