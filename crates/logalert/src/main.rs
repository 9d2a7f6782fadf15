mod telemetry;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use logalert_core::config::Config;
use logalert_pipeline::bus::HttpBusClient;
use logalert_pipeline::decode::decode_envelope;
use logalert_pipeline::render::render_offset;
use logalert_pipeline::run::{process_envelope, render_documents};

use crate::telemetry::init_cli_tracing;

#[derive(Parser, Debug)]
#[command(name = "logalert")]
#[command(about = "Decode a log envelope, render notifications, publish to an event bus")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Run the full pipeline: decode, render, publish")]
    Publish {
        #[command(flatten)]
        input: EnvelopeInput,
        #[command(flatten)]
        overrides: ConfigFlags,
        #[arg(long, help = "PutEvents endpoint; overrides the configured one")]
        endpoint: Option<String>,
    },
    #[command(about = "Decode and render only; print documents to stdout")]
    Render {
        #[command(flatten)]
        input: EnvelopeInput,
        #[command(flatten)]
        overrides: ConfigFlags,
    },
}

#[derive(Args, Debug)]
struct EnvelopeInput {
    #[arg(help = "Envelope file, or - for stdin", default_value = "-")]
    envelope: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigFlags {
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    system_name: Option<String>,
    #[arg(long)]
    event_bus_name: Option<String>,
}

impl ConfigFlags {
    fn apply(self, cfg: &mut Config) {
        if let Some(v) = self.region {
            cfg.region = v;
        }
        if let Some(v) = self.system_name {
            cfg.system_name = v;
        }
        if let Some(v) = self.event_bus_name {
            cfg.event_bus_name = v;
        }
    }
}

fn read_envelope(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading envelope from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading envelope from {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_cli_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Publish {
            input,
            overrides,
            endpoint,
        } => {
            let mut cfg = Config::load()?;
            overrides.apply(&mut cfg);
            if let Some(v) = endpoint {
                cfg.bus_endpoint = Some(v);
            }

            let endpoint = cfg
                .bus_endpoint
                .clone()
                .context("no event bus endpoint configured (LOGALERT_BUS_ENDPOINT or --endpoint)")?;
            let client = HttpBusClient::new(&endpoint, cfg.publish_timeout)?;

            let envelope = read_envelope(&input.envelope)?;
            let published = process_envelope(&envelope, &cfg, &client).await?;
            tracing::info!(published, bus = %cfg.event_bus_name, "batch published");
        }
        Commands::Render { input, overrides } => {
            let mut cfg = Config::load()?;
            overrides.apply(&mut cfg);

            let envelope = read_envelope(&input.envelope)?;
            let batch = decode_envelope(&envelope)?;
            let rendered_at = Utc::now().with_timezone(&render_offset());
            for document in render_documents(&batch, &cfg, rendered_at)? {
                println!("{document}");
            }
        }
    }

    Ok(())
}
