//! Run command: the long-lived tracking loop.
//!
//! Reads browser events line by line, fires the checkpoint alarm on a fixed
//! cadence, and commits the open session on suspend, EOF or Ctrl-C. Responses
//! to `getWebUsageData` requests are written to stdout, one JSON object per
//! line; all logging goes to stderr.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior};

use wu_core::{Accumulator, CHECKPOINT_ALARM, Clock, SystemClock, UsageStore};
use wu_db::Database;

use crate::Config;
use crate::events::{BrowserEvent, Outcome, TabRegistry, UsageResponse, dispatch};

pub fn run(config: &Config, input: Option<&Path>) -> Result<()> {
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let mut acc = Accumulator::initialize(db, SystemClock).context("failed to load usage data")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;

    runtime.block_on(async {
        let mut stdout = tokio::io::stdout();
        let interval = config.checkpoint_interval();
        match input {
            Some(path) => {
                let file = tokio::fs::File::open(path)
                    .await
                    .with_context(|| format!("failed to open {}", path.display()))?;
                event_loop(BufReader::new(file), &mut stdout, &mut acc, interval).await
            }
            None => {
                let stdin = BufReader::new(tokio::io::stdin());
                event_loop(stdin, &mut stdout, &mut acc, interval).await
            }
        }
    })
}

/// Feeds events from `reader` into the accumulator until the stream ends or
/// the browser suspends. The open session is always committed on return,
/// including when reading the stream fails.
pub async fn event_loop<R, W, S, C>(
    reader: R,
    writer: &mut W,
    acc: &mut Accumulator<S, C>,
    checkpoint_interval: Duration,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: UsageStore,
    C: Clock,
{
    let mut lines = reader.split(b'\n');
    let mut tabs = TabRegistry::default();

    let mut ticker =
        tokio::time::interval_at(Instant::now() + checkpoint_interval, checkpoint_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(
        alarm = CHECKPOINT_ALARM,
        period_secs = checkpoint_interval.as_secs(),
        "registered checkpoint alarm"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut watching_ctrl_c = true;

    let result = loop {
        tokio::select! {
            segment = lines.next_segment() => {
                let bytes = match segment {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => {
                        tracing::info!("event stream closed");
                        break Ok(());
                    }
                    Err(err) => {
                        break Err(anyhow::Error::new(err).context("failed to read event"));
                    }
                };
                let Ok(line) = std::str::from_utf8(&bytes) else {
                    tracing::warn!(len = bytes.len(), "skipping event that is not UTF-8");
                    continue;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let event: BrowserEvent = match serde_json::from_str(line) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(%err, line, "skipping malformed event");
                        continue;
                    }
                };

                match dispatch(acc, &mut tabs, event) {
                    Outcome::Continue => {}
                    Outcome::Respond(response) => {
                        if let Err(err) = respond(writer, &response).await {
                            tracing::warn!(%err, "failed to write response");
                        }
                    }
                    Outcome::Shutdown => return Ok(()),
                }
            }
            _ = ticker.tick() => {
                tracing::debug!(alarm = CHECKPOINT_ALARM, "alarm fired");
                acc.on_checkpoint_timer();
            }
            signal = &mut ctrl_c, if watching_ctrl_c => {
                match signal {
                    Ok(()) => {
                        tracing::info!("interrupted");
                        break Ok(());
                    }
                    Err(err) => {
                        tracing::warn!(%err, "cannot listen for Ctrl-C");
                        watching_ctrl_c = false;
                    }
                }
            }
        }
    };

    acc.on_shutdown();
    result
}

/// Writes one response line and flushes it.
async fn respond<W>(writer: &mut W, response: &UsageResponse) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut out = serde_json::to_string(response)?;
    out.push('\n');
    writer.write_all(out.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
