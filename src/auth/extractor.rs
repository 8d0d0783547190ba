//! Actix-web extractor resolving the requesting user.
//!
//! # Security
//! - The API key from the header is wrapped in `SecretString` immediately
//! - Key values are never logged or exposed in debug output
//! - Requests without a key are anonymous; a key that matches no user is rejected

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use secrecy::{ExposeSecret, SecretString};
use std::future::{Ready, ready};

use super::UserDirectory;
use crate::config::API_KEY_HEADER;
use crate::error::AppError;
use crate::models::Requester;

/// Extract a secret header value, wrapping it in SecretString.
/// Returns None if the header is missing or invalid UTF-8.
fn extract_secret_header(req: &HttpRequest, header_name: &str) -> Option<SecretString> {
    req.headers()
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|s| SecretString::from(s.to_string()))
}

/// Extractor yielding the caller of a request.
///
/// ```ignore
/// async fn handler(identity: Identity) -> impl Responder {
///     // identity.requester is Anonymous or an authenticated User
/// }
/// ```
pub struct Identity {
    pub requester: Requester,
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(provided) = extract_secret_header(req, API_KEY_HEADER) else {
            return ready(Ok(Identity {
                requester: Requester::Anonymous,
            }));
        };

        let Some(directory) = req.app_data::<web::Data<UserDirectory>>() else {
            return ready(Err(AppError::Unauthorized(
                "API keys are not accepted by this server".to_string(),
            )));
        };

        match directory.verify(provided.expose_secret()) {
            Some(requester) => ready(Ok(Identity { requester })),
            None => ready(Err(AppError::Unauthorized("Invalid API key".to_string()))),
        }
        // Note: provided is dropped here, memory zeroized
    }
}
