//! Script-backed endpoints
//!
//! Both POST endpoints share one pipeline: parse the body, require fields,
//! run the endpoint's script, map its outcome to a response. They differ only
//! in the fields they require, the script they run, and their messages.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::path::Path;
use std::sync::Arc;

use super::params::{self, Params};
use crate::config::{AppState, ScriptPaths};
use crate::http::{self as http_resp, ScriptResponse};
use crate::logger;
use crate::script::{self, ScriptError, ScriptOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Authenticate,
    ContactUs,
}

impl Endpoint {
    /// Fields passed to the script, in argument order
    pub const fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Authenticate => &["email", "code"],
            Self::ContactUs => &["name", "email", "subject", "message"],
        }
    }

    const fn missing_fields_message(self) -> &'static str {
        match self {
            Self::Authenticate => "Missing required parameters 'email' and 'code'",
            Self::ContactUs => {
                "Missing required parameters: 'name', 'email', 'subject', and 'message'"
            }
        }
    }

    const fn success_message(self) -> &'static str {
        match self {
            Self::Authenticate => "Authentication successful",
            Self::ContactUs => "Contact form submitted successfully",
        }
    }

    const fn failure_message(self) -> &'static str {
        match self {
            Self::Authenticate => "Authentication failed",
            Self::ContactUs => "Failed to send contact form",
        }
    }

    /// Status for a script that ran and exited non-zero
    const fn failure_status(self) -> StatusCode {
        match self {
            Self::Authenticate => StatusCode::UNAUTHORIZED,
            Self::ContactUs => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Authenticate => "Authentication",
            Self::ContactUs => "Contact form",
        }
    }

    const fn timeout_message(self) -> &'static str {
        match self {
            Self::Authenticate => "Authentication timeout",
            Self::ContactUs => "Contact form submission timeout",
        }
    }

    fn script(self, scripts: &ScriptPaths) -> &Path {
        match self {
            Self::Authenticate => &scripts.authenticate,
            Self::ContactUs => &scripts.contact,
        }
    }
}

/// Handle a POST to `endpoint` whose body has already been read
pub async fn handle(endpoint: Endpoint, body: Bytes, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let params = params::parse_body(&body).unwrap_or_else(|e| {
        logger::log_warning(&format!("Unparseable request body: {e}"));
        Params::default()
    });

    let Some(args) = params.require(endpoint.required_fields()) else {
        logger::log_warning(&format!(
            "{endpoint:?}: missing required parameters (body encoding: {:?})",
            params.encoding()
        ));
        return http_resp::build_error_response(
            StatusCode::BAD_REQUEST,
            endpoint.missing_fields_message(),
        );
    };

    let result = script::run(endpoint.script(&state.scripts), &args, state.script_timeout).await;
    respond(endpoint, result)
}

/// Map a script result to the endpoint's response
pub fn respond(endpoint: Endpoint, result: Result<ScriptOutput, ScriptError>) -> Response<Full<Bytes>> {
    match result {
        Ok(out) if out.success() => http_resp::build_json_response(
            StatusCode::OK,
            &ScriptResponse::succeeded(endpoint.success_message(), out.stdout.trim()),
        ),
        Ok(out) => http_resp::build_json_response(
            endpoint.failure_status(),
            &ScriptResponse::failed(endpoint.failure_message(), out.stderr.trim()),
        ),
        Err(ScriptError::Timeout(_)) => {
            http_resp::build_error_response(StatusCode::GATEWAY_TIMEOUT, endpoint.timeout_message())
        }
        Err(e @ (ScriptError::NotFound | ScriptError::NotExecutable)) => {
            logger::log_error(&format!("{} {e}", endpoint.label()));
            http_resp::build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("{} {e}", endpoint.label()),
            )
        }
        Err(ScriptError::Io(e)) => {
            logger::log_error(&format!("{} script failed: {e}", endpoint.label()));
            http_resp::build_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Internal server error: {e}"),
            )
        }
    }
}
