//! CLI argument parsing, validation, and startup helpers.

use clap::Parser;
use tracing::{error, warn};

use crate::{AuthConfig, DEFAULT_SECRET_KEY};

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "beargate",
    about = "JWT authentication filter in front of an axum service"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8925")]
    pub port: u16,

    /// Whether non-exempt requests must present a valid credential
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub require_authorized: bool,

    /// Exclusion rule in "METHOD:pathPrefix" or bare "pathPrefix" form. Repeatable
    #[arg(long = "exclude-path", value_name = "RULE")]
    pub exclude_paths: Vec<String>,

    /// Path to file containing the JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub secret_key_file: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load the JWT secret from environment variable or file, falling back to
/// the built-in development secret with a loud warning.
/// Returns None and logs an error if the secret file cannot be read.
pub fn load_secret_key(secret_key_file: Option<&str>) -> Option<String> {
    if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        return Some(secret);
    }

    if let Some(path) = secret_key_file {
        return match std::fs::read_to_string(path) {
            Ok(content) => Some(content.trim().to_string()),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret key file");
                None
            }
        };
    }

    warn!(
        "Using the built-in development secret. Set JWT_SECRET (recommended) or --secret-key-file in production"
    );
    Some(DEFAULT_SECRET_KEY.to_string())
}

/// Build AuthConfig from parsed arguments and the resolved secret.
pub fn build_config(args: &Args, secret_key: String) -> AuthConfig {
    AuthConfig {
        secret_key,
        require_authorized: args.require_authorized,
        exclude_paths: args.exclude_paths.clone(),
    }
}
