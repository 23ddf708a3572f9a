pub mod api;
pub mod cli;
pub mod context;
pub mod exclude;
pub mod filter;
pub mod identity;
pub mod jwt;
pub mod respond;

use axum::Router;

use exclude::RuleError;
use filter::AuthFilter;

/// Built-in development secret, matching the historical default of the
/// systems this filter fronts. Must be overridden in production.
pub const DEFAULT_SECRET_KEY: &str = "test";

/// Immutable authentication configuration, fixed at startup and shared
/// read-only across all concurrent requests.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret used to verify token signatures
    pub secret_key: String,
    /// Whether non-exempt requests must present a valid credential
    pub require_authorized: bool,
    /// Exclusion rules in "METHOD:pathPrefix" or bare-prefix form
    pub exclude_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            require_authorized: true,
            exclude_paths: Vec::new(),
        }
    }
}

/// Create the application router with the authentication filter applied
/// to every route. Fails on malformed exclusion rules.
pub fn create_app(config: &AuthConfig) -> Result<Router, RuleError> {
    let filter = AuthFilter::new(config)?;
    Ok(filter.apply(api::router()))
}
