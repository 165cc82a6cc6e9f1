//! # TurboDocx Webhook Receiver
//!
//! Main entry point: loads configuration, sets up telemetry and serves the
//! webhook endpoint (TLS in production).
#![recursion_limit = "256"]

use anyhow::Context;
use logfire::config::{MetricsOptions, SendToLogfire};
use ntex::web;
use openssl::ssl::{SslAcceptor, SslFiletype, SslMethod};

use turbodocx_webhook::{
    config::{AppConfig, WebhookSecret},
    server,
    webhook::{self, turbodocx},
};

#[ntex::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::load()?;

    // Initialize logging and metrics
    let mut telemetry = logfire::configure()
        .install_panic_handler()
        .with_metrics(Some(MetricsOptions::default()))
        .send_to_logfire(SendToLogfire::IfTokenPresent);
    if let Some(token) = &app_config.logfire_token {
        telemetry = telemetry.with_token(token);
    }
    let shutdown_handler = telemetry.finish()?;

    let webhook_secret = app_config.webhook_secret()?;
    tracing::info!(
        "Webhook secret configured: {} characters",
        webhook_secret.len()
    );

    configure_and_run_server(&app_config, webhook_secret).await?;

    shutdown_handler.shutdown()?;

    Ok(())
}

/// Configures SSL acceptor for production environments
fn setup_ssl_acceptor(app_config: &AppConfig) -> anyhow::Result<openssl::ssl::SslAcceptorBuilder> {
    let mut ssl_acceptor = SslAcceptor::mozilla_intermediate(SslMethod::tls_server())
        .context("Failed to create SSL acceptor")?;

    ssl_acceptor
        .set_private_key_file(&app_config.private_key_path, SslFiletype::PEM)
        .with_context(|| {
            format!(
                "Failed to load private key from {}",
                app_config.private_key_path
            )
        })?;

    ssl_acceptor
        .set_certificate_file(&app_config.certificate_path, SslFiletype::PEM)
        .with_context(|| {
            format!(
                "Failed to load certificate from {}",
                app_config.certificate_path
            )
        })?;

    Ok(ssl_acceptor)
}

/// Creates the per-worker application state
fn create_app_state(webhook_secret: WebhookSecret) -> turbodocx::AppState {
    turbodocx::AppState {
        webhook_secret,
        dispatcher: turbodocx::handler::EventDispatcher::default(),
    }
}

/// Configures and starts the web server with appropriate SSL settings
async fn configure_and_run_server(
    app_config: &AppConfig,
    webhook_secret: WebhookSecret,
) -> anyhow::Result<()> {
    let server_addr = app_config.server_addr();

    let server = web::server(move || {
        web::App::new()
            .wrap(web::middleware::Logger::default())
            .wrap(web::middleware::Compress::default())
            .state(create_app_state(webhook_secret.clone()))
            .configure(webhook::routes::turbodocx)
            .service(server::health)
            .default_service(web::route().to(server::serve_not_found))
    });

    let bound_server = if app_config.is_prod() {
        let ssl_acceptor = setup_ssl_acceptor(app_config)?;
        server.bind_openssl(server_addr, ssl_acceptor)?
    } else {
        server.bind(server_addr)?
    };

    tracing::info!(
        "Webhook server listening on {}:{}",
        app_config.web_server_host,
        app_config.web_server_port
    );

    bound_server
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
