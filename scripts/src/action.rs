use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use turbodocx_webhook::{config::WebhookSecret, consts};

use crate::{config, utils};

#[derive(Args, Debug, Clone)]
pub struct SignArgs {
    /// JSON body to sign, read as raw bytes
    #[arg(short, long)]
    file: PathBuf,
    /// Unix seconds to sign with, defaults to now
    #[arg(short, long)]
    timestamp: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Receiver endpoint, e.g. http://localhost:8080/webhook
    #[arg(short, long)]
    url: String,
    #[arg(short, long, default_value = consts::EVENT_DOCUMENT_COMPLETED)]
    event: String,
    #[arg(short, long)]
    document_id: Option<String>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    /// Prints the TurboDocx signature headers for a body file
    Sign(SignArgs),
    /// Sends a signed test delivery to a running receiver
    Send(SendArgs),
}

/// Tools to exercise a TurboDocx webhook receiver
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let app_config = config::AppConfig::load()?;
        let secret = WebhookSecret::try_new(app_config.webhook_secret.as_str())?;
        let now = chrono::Utc::now().timestamp();

        match &self.action {
            Action::Sign(SignArgs { file, timestamp }) => {
                let body = std::fs::read(file)
                    .with_context(|| format!("couldn't read {}", file.display()))?;
                let delivery = utils::sign_body(&secret, body, timestamp.unwrap_or(now))?;

                println!("{}: {}", consts::SIGNATURE_HEADER, delivery.signature);
                println!("{}: {}", consts::TIMESTAMP_HEADER, delivery.timestamp);
                Ok(())
            }
            Action::Send(SendArgs {
                url,
                event,
                document_id,
            }) => {
                let body = utils::build_envelope_body(event, document_id.as_deref())?;
                let delivery = utils::sign_body(&secret, body, now)?;

                let (status, response) = utils::send_delivery(url, &delivery).await?;
                log::info!("{url} answered {status}: {response}");

                if !(200..300).contains(&status) {
                    bail!("receiver rejected the delivery with status {status}");
                }
                Ok(())
            }
        }
    }
}
