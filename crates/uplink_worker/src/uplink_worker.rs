use crate::domain::{SinkWriter, UplinkOutcome, UplinkService};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub struct UplinkWorkerConfig {
    /// Forward error-shaped outputs to the sink instead of only logging them.
    pub emit_errors: bool,
}

/// Counters reported when the input is exhausted or the worker is cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub records: u64,
    pub skipped: u64,
    pub failed: u64,
}

pub struct UplinkWorker {
    service: UplinkService,
    writer: Arc<dyn SinkWriter>,
    config: UplinkWorkerConfig,
}

impl UplinkWorker {
    pub fn new(
        service: UplinkService,
        writer: Arc<dyn SinkWriter>,
        config: UplinkWorkerConfig,
    ) -> Self {
        Self {
            service,
            writer,
            config,
        }
    }

    /// Process uplink documents, one per line, until the input ends or `ctx`
    /// is cancelled. Blank lines are ignored.
    pub async fn run<R>(&self, input: R, ctx: CancellationToken) -> anyhow::Result<WorkerStats>
    where
        R: AsyncBufRead + Unpin,
    {
        // Raw byte lines: a line that is not UTF-8 is one bad document, not a
        // broken stream.
        let mut lines = input.split(b'\n');
        let mut stats = WorkerStats::default();

        loop {
            let line = tokio::select! {
                _ = ctx.cancelled() => {
                    debug!("uplink worker cancelled");
                    break;
                }
                line = lines.next_segment() => line?,
            };

            let Some(line) = line else {
                debug!("end of uplink input");
                break;
            };
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }

            let outcome = self.service.process_uplink(&line);
            match &outcome {
                UplinkOutcome::Record(_) => stats.records += 1,
                UplinkOutcome::Skipped { .. } => {
                    stats.skipped += 1;
                    continue;
                }
                UplinkOutcome::Failed { .. } => {
                    stats.failed += 1;
                    if !self.config.emit_errors {
                        continue;
                    }
                }
            }

            if let Some(output) = outcome.to_output() {
                if let Err(e) = self.writer.write(&output).await {
                    error!(error = %e, "failed to write sink output");
                    return Err(e.into());
                }
            }
        }

        info!(
            records = stats.records,
            skipped = stats.skipped,
            failed = stats.failed,
            "uplink worker stopped"
        );

        Ok(stats)
    }
}
