use milesight_payload::TlvDecoder;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uplink_worker::config::ServiceConfig;
use uplink_worker::domain::{JsonLinesWriter, UplinkService};
use uplink_worker::telemetry::{init_telemetry, TelemetryConfig};
use uplink_worker::uplink_worker::{UplinkWorker, UplinkWorkerConfig};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!(
        input = config.input_path.as_deref().unwrap_or("stdin"),
        emit_errors = config.emit_errors,
        "Starting uplink worker"
    );
    debug!("Configuration: {:?}", config);

    let input: Box<dyn AsyncBufRead + Unpin + Send> = match &config.input_path {
        Some(path) => match tokio::fs::File::open(path).await {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!(path = %path, "Failed to open uplink input: {}", e);
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let decoder = Arc::new(TlvDecoder::em500_smt());
    let service = UplinkService::new(decoder);
    let writer = Arc::new(JsonLinesWriter::new(tokio::io::stdout()));
    let worker = UplinkWorker::new(
        service,
        writer,
        UplinkWorkerConfig {
            emit_errors: config.emit_errors,
        },
    );

    let ctx = CancellationToken::new();
    let shutdown = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            shutdown.cancel();
        }
    });

    match worker.run(input, ctx).await {
        Ok(_) => info!("Uplink worker finished"),
        Err(e) => {
            error!("Uplink worker failed: {}", e);
            std::process::exit(1);
        }
    }
}
