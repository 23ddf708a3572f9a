//! The authentication filter.
//!
//! Runs ahead of every routed handler: decides bypass vs. enforce, pulls
//! the bearer credential, delegates verification, and binds the request
//! context for downstream handlers. Aborts with `401 Unauthorized` when a
//! non-exempt request carries no usable `Authorization` header or its
//! token fails verification; the downstream handler never runs in either
//! failure case.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{Level, debug, info, warn};

use crate::AuthConfig;
use crate::context::RequestContext;
use crate::exclude::{ExcludeMatcher, RuleError};
use crate::identity::Identity;
use crate::jwt::TokenVerifier;
use crate::respond;

/// The scheme prefix a usable `Authorization` header must carry,
/// trailing space included. Matched case-sensitively.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Failure body when the header is absent or carries the wrong scheme.
pub const MSG_NO_VALID_HEADER: &str = "No valid jwt 'Authorization' header";

/// Failure body when the token fails verification.
pub const MSG_INVALID_JWT: &str = "Invalid JWT";

/// Extras key for the request path.
pub const EXTRA_PATH: &str = "path";
/// Extras key for the raw `Authorization` header value.
pub const EXTRA_AUTHORIZATION: &str = "authorization";
/// Extras key for the `Origin` header value, set only when present.
pub const EXTRA_ORIGIN: &str = "origin";

/// Pull the bearer credential out of the `Authorization` header.
///
/// `None` for an absent header, a non-UTF-8 value, or a value without the
/// exact `"Bearer "` prefix. Absence is a normal outcome, not an error;
/// the filter maps it to its own failure message.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
}

/// The authentication filter. Stateless after construction: the verifier,
/// rule set and enforcement flag are read-only, so one instance serves all
/// concurrent requests without locking.
pub struct AuthFilter {
    verifier: TokenVerifier,
    matcher: ExcludeMatcher,
    require_authorized: bool,
}

impl AuthFilter {
    /// Build the filter from configuration.
    ///
    /// Fails on malformed exclusion rules; nothing here can fail at
    /// request time.
    pub fn new(config: &AuthConfig) -> Result<Self, RuleError> {
        let matcher = ExcludeMatcher::parse(&config.exclude_paths)?;
        info!(
            require_authorized = config.require_authorized,
            exclude_paths = ?config.exclude_paths,
            "Registered authentication filter"
        );
        Ok(Self {
            verifier: TokenVerifier::new(config.secret_key.as_bytes()),
            matcher,
            require_authorized: config.require_authorized,
        })
    }

    /// Apply the filter to every route of the given router.
    pub fn apply(self, router: Router) -> Router {
        router.layer(middleware::from_fn_with_state(Arc::new(self), authenticate))
    }

    /// Whether this request skips authentication entirely: enforcement
    /// globally off, a CORS preflight, or an exempt `(method, path)` pair.
    fn is_bypassed(&self, method: &Method, path: &str) -> bool {
        !self.require_authorized
            || method == Method::OPTIONS
            || self.matcher.is_exempt(method, path)
    }
}

/// Filter middleware applied ahead of every routed handler.
pub async fn authenticate(
    State(filter): State<Arc<AuthFilter>>,
    mut req: Request,
    next: Next,
) -> Response {
    if filter.is_bypassed(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let Some(token) = bearer_token(req.headers()) else {
        return respond::unauthorized(Some(MSG_NO_VALID_HEADER));
    };

    match filter.verifier.verify(token) {
        Ok(claims) => {
            debug!("jwt verify success");
            let mut identity = Identity::from_claims(&claims);
            bind_extras(&mut identity, &req);
            req.extensions_mut().insert(RequestContext::new(identity));
            next.run(req).await
        }
        Err(e) => {
            // Detail stays in the logs; the client only ever sees the
            // fixed message.
            if tracing::enabled!(Level::DEBUG) {
                debug!(error = ?e, "jwt verify failed");
            } else {
                warn!(error = %e, "jwt verify failed");
            }
            respond::unauthorized(Some(MSG_INVALID_JWT))
        }
    }
}

/// Populate the identity's diagnostic extras: the request path, the raw
/// `Authorization` header, and the `Origin` header when present.
fn bind_extras(identity: &mut Identity, req: &Request) {
    identity
        .extras
        .insert(EXTRA_PATH.to_string(), req.uri().path().to_string());
    if let Some(raw) = header_str(req.headers(), header::AUTHORIZATION) {
        identity
            .extras
            .insert(EXTRA_AUTHORIZATION.to_string(), raw.to_string());
    }
    if let Some(origin) = header_str(req.headers(), header::ORIGIN) {
        identity
            .extras
            .insert(EXTRA_ORIGIN.to_string(), origin.to_string());
    }
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
