//! The batch accumulator: sole owner of the open batch.
//!
//! One task turns the arrival stream into size/time-bounded batches. There
//! is no lock around batch state; the accumulator is the only mutator and
//! batches leave it by move.

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, sleep_until};

use crate::config::BatcherConfig;
use crate::request::{Batch, ReadRequest};

pub(crate) struct Accumulator {
    arrivals: mpsc::Receiver<ReadRequest>,
    batches: mpsc::Sender<Batch>,
    shutdown: Arc<Notify>,
    max_batch_size: usize,
    batching_timeout: Duration,
}

impl Accumulator {
    pub(crate) fn new(
        arrivals: mpsc::Receiver<ReadRequest>,
        batches: mpsc::Sender<Batch>,
        shutdown: Arc<Notify>,
        config: &BatcherConfig,
    ) -> Self {
        Self {
            arrivals,
            batches,
            shutdown,
            max_batch_size: config.max_batch_size,
            batching_timeout: config.batching_timeout,
        }
    }

    /// Runs until the arrival stream is closed and drained.
    ///
    /// Two triggers flush the open batch, whichever fires first: it reaches
    /// `max_batch_size`, or `batching_timeout` elapses since its first
    /// entry. The deadline arm is guarded on a non-empty batch and re-armed
    /// only when a first entry lands, so a stale deadline can never flush an
    /// empty batch or corrupt a fresh one.
    pub(crate) async fn run(mut self) {
        let mut batch: Batch = Vec::with_capacity(self.max_batch_size);
        // Armed on the first entry of each batch; elapsed and unpolled
        // while the batch is empty.
        let deadline = sleep_until(Instant::now());
        tokio::pin!(deadline);
        let mut closing = false;

        loop {
            tokio::select! {
                arrival = self.arrivals.recv() => {
                    match arrival {
                        Some(request) => {
                            if batch.is_empty() {
                                deadline
                                    .as_mut()
                                    .reset(Instant::now() + self.batching_timeout);
                            }
                            batch.push(request);
                            if batch.len() == self.max_batch_size {
                                let full = mem::replace(
                                    &mut batch,
                                    Vec::with_capacity(self.max_batch_size),
                                );
                                if self.flush(full, "size").await.is_err() {
                                    return;
                                }
                            }
                        }
                        None => {
                            // Stream closed and drained. Flush the residual
                            // batch; never emit an empty one. Dropping
                            // `self.batches` lets workers finish once their
                            // queue empties.
                            if !batch.is_empty() {
                                let _ = self.flush(batch, "shutdown").await;
                            }
                            return;
                        }
                    }
                }
                _ = &mut deadline, if !batch.is_empty() => {
                    let partial =
                        mem::replace(&mut batch, Vec::with_capacity(self.max_batch_size));
                    if self.flush(partial, "timeout").await.is_err() {
                        return;
                    }
                }
                _ = self.shutdown.notified(), if !closing => {
                    // Refuse new submissions; requests already buffered in
                    // the arrival queue still drain through the recv arm.
                    self.arrivals.close();
                    closing = true;
                }
            }
        }
    }

    async fn flush(
        &self,
        batch: Batch,
        trigger: &'static str,
    ) -> Result<(), mpsc::error::SendError<Batch>> {
        tracing::debug!(len = batch.len(), trigger, "flushing batch");
        metrics::counter!("batcher_flushes_total", "trigger" => trigger).increment(1);
        metrics::histogram!("batcher_batch_size").record(batch.len() as f64);
        self.batches.send(batch).await
    }
}
