use std::io::Write;
use std::thread;
use std::time::Duration;

use scalepipe_frame::{FrameAssembler, FrameQueue};
use scalepipe_telemetry::{parse_frame, SnapshotStore};
use scalepipe_transport::Transport;
use tracing::{debug, error, info};

use crate::cancel::CancelToken;
use crate::error::{PipelineError, Result};
use crate::publisher::{now_unix_seconds, Publisher};

/// Bound on one parser wait cycle, and therefore on the parser's
/// cancellation latency.
const POP_WAIT: Duration = Duration::from_millis(250);

/// Validated pipeline settings.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    publish_interval: u64,
}

impl PipelineConfig {
    /// `publish_interval` is seconds between publishes and must be in
    /// `1..=60`.
    pub fn new(publish_interval: u64) -> Result<Self> {
        if !(1..=60).contains(&publish_interval) {
            return Err(PipelineError::InvalidInterval(publish_interval));
        }
        Ok(Self { publish_interval })
    }

    pub fn publish_interval(&self) -> u64 {
        self.publish_interval
    }
}

/// Run the full pipeline until cancellation or a fatal failure.
///
/// Spawns the assembler, parser, and publisher as scoped threads and
/// waits for all three before closing the transport, so the line is
/// released only once nothing can still read it. The first stage
/// error is returned; whatever failed has already cancelled the
/// shared token, so the remaining stages stop within one blocking
/// cycle.
pub fn run<T, W>(
    transport: &mut T,
    config: PipelineConfig,
    sink: W,
    cancel: &CancelToken,
) -> Result<()>
where
    T: Transport + Send,
    W: Write + Send,
{
    let queue = FrameQueue::new();
    let store = SnapshotStore::new();

    info!("pipeline starting");

    let (assembler, parser, publisher) = thread::scope(|scope| {
        let assembler = scope.spawn(|| {
            let result = assembler_stage(transport, &queue, cancel);
            if let Err(err) = &result {
                error!(%err, "assembler stage failed");
                cancel.cancel();
            }
            result
        });
        let parser = scope.spawn(|| {
            let result = parser_stage(&queue, &store, cancel);
            if let Err(err) = &result {
                error!(%err, "parser stage failed");
                cancel.cancel();
            }
            result
        });
        let publisher = scope.spawn(|| {
            let result = Publisher::new(config.publish_interval, sink).run(&store, cancel);
            if let Err(err) = &result {
                error!(%err, "publisher stage failed");
                cancel.cancel();
            }
            result
        });

        (
            join_stage(assembler, "assembler", cancel),
            join_stage(parser, "parser", cancel),
            join_stage(publisher, "publisher", cancel),
        )
    });

    // Stage failures outrank a close failure in what gets reported.
    let closed = transport.close();
    info!("pipeline stopped");

    assembler?;
    parser?;
    publisher?;
    closed?;
    Ok(())
}

fn join_stage(
    handle: thread::ScopedJoinHandle<'_, Result<()>>,
    name: &'static str,
    cancel: &CancelToken,
) -> Result<()> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => {
            cancel.cancel();
            Err(PipelineError::StagePanic(name))
        }
    }
}

/// Producer stage: read chunks, reassemble frames, queue them.
///
/// Empty chunks (a silent line for one read cycle) exist exactly so
/// this loop re-checks the token. A failed read is fatal and cancels
/// the whole pipeline; there is no reconnection policy.
fn assembler_stage<T: Transport>(
    transport: &mut T,
    queue: &FrameQueue,
    cancel: &CancelToken,
) -> Result<()> {
    let mut assembler = FrameAssembler::new();
    while !cancel.is_cancelled() {
        let chunk = transport.read_chunk()?;
        if let Some(frame) = assembler.feed(&chunk) {
            queue.push(frame);
            debug!(depth = queue.len(), "frame queued");
        }
    }
    debug!("assembler stopped");
    Ok(())
}

/// Processor stage: pop frames in FIFO order, parse, replace the
/// latest snapshot.
fn parser_stage(queue: &FrameQueue, store: &SnapshotStore, cancel: &CancelToken) -> Result<()> {
    while !cancel.is_cancelled() {
        let Some(frame) = queue.pop_timeout(POP_WAIT) else {
            continue;
        };
        let snapshot = parse_frame(&frame, now_unix_seconds()?);
        store.replace(snapshot);
    }
    debug!("parser stopped");
    Ok(())
}
