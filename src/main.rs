use beargate::cli::{Args, build_config, init_logging, load_secret_key};
use beargate::create_app;
use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(secret_key) = load_secret_key(args.secret_key_file.as_deref()) else {
        std::process::exit(1);
    };

    let config = build_config(&args, secret_key);

    let app = match create_app(&config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "Invalid exclusion rule");
            std::process::exit(1);
        }
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap();
    info!(address = %local_addr, "Listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
