//! Lifecycle and the caller-facing read operation.

use std::sync::Arc;
use std::time::Duration;

use store::{KeyValueStore, Row};
use tokio::sync::{Mutex, Notify, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::accumulator::Accumulator;
use crate::config::BatcherConfig;
use crate::error::{ConfigError, ReadError};
use crate::request::ReadRequest;
use crate::worker;

/// Handle to a running read micro-batcher.
///
/// Cheap to clone; all clones share the same accumulator and worker pool.
/// Created by [`ReadBatcher::start`], torn down by [`ReadBatcher::stop`].
#[derive(Clone)]
pub struct ReadBatcher {
    arrivals: mpsc::Sender<ReadRequest>,
    shutdown: Arc<Notify>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
    read_timeout: Duration,
}

impl ReadBatcher {
    /// Validates `config`, then launches the accumulator and `worker_count`
    /// workers against `store`.
    pub fn start<S>(store: S, config: BatcherConfig) -> Result<Self, ConfigError>
    where
        S: KeyValueStore + 'static,
    {
        config.validate()?;

        let store = Arc::new(store);
        let (arrivals_tx, arrivals_rx) = mpsc::channel(config.arrival_capacity);
        // Queue bound proportional to the pool: flushes await here when
        // every worker is busy.
        let (batches_tx, batches_rx) = mpsc::channel(config.worker_count);
        let queue: worker::BatchQueue = Arc::new(Mutex::new(batches_rx));
        let shutdown = Arc::new(Notify::new());

        let mut tasks = Vec::with_capacity(config.worker_count + 1);
        for _ in 0..config.worker_count {
            tasks.push(tokio::spawn(worker::run(
                Arc::clone(&store),
                Arc::clone(&queue),
            )));
        }
        let accumulator =
            Accumulator::new(arrivals_rx, batches_tx, Arc::clone(&shutdown), &config);
        tasks.push(tokio::spawn(accumulator.run()));

        tracing::info!(
            max_batch_size = config.max_batch_size,
            worker_count = config.worker_count,
            batching_timeout = ?config.batching_timeout,
            read_timeout = ?config.read_timeout,
            arrival_capacity = config.arrival_capacity,
            "read batcher started"
        );

        Ok(Self {
            arrivals: arrivals_tx,
            shutdown,
            tasks: Arc::new(Mutex::new(tasks)),
            read_timeout: config.read_timeout,
        })
    }

    /// Reads one key, waiting at most the configured `read_timeout`.
    ///
    /// Returns `Ok(Some(row))` when the key exists, `Ok(None)` when it does
    /// not. A timed-out read is not retracted from its batch: the worker may
    /// still resolve it against the store, and that late outcome is
    /// discarded. Wasted store work under heavy timeouts, never a
    /// correctness problem, since each reply slot has a single private
    /// writer.
    pub async fn read(&self, key: &str) -> Result<Option<Row>, ReadError> {
        self.read_with_timeout(key, self.read_timeout).await
    }

    /// Like [`read`](Self::read) with a caller-chosen wait bound covering
    /// both submission (the arrival queue may be full) and the reply wait.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn read_with_timeout(
        &self,
        key: &str,
        timeout: Duration,
    ) -> Result<Option<Row>, ReadError> {
        metrics::counter!("batcher_reads_total").increment(1);

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = ReadRequest {
            key: key.to_owned(),
            reply: reply_tx,
        };

        let submit_and_wait = async {
            self.arrivals
                .send(request)
                .await
                .map_err(|_| ReadError::Closed)?;
            match reply_rx.await {
                Ok(outcome) => outcome.map_err(ReadError::from),
                // The request was dropped unresolved, which only happens on
                // the way down.
                Err(_) => Err(ReadError::Closed),
            }
        };

        match tokio::time::timeout(timeout, submit_and_wait).await {
            Ok(result) => result,
            Err(_) => Err(ReadError::Timeout { waited: timeout }),
        }
    }

    /// Stops the batcher: closes the arrival stream, flushes whatever batch
    /// is open, and waits for the workers to drain their queue.
    ///
    /// Requests submitted before the stream closes still resolve; reads
    /// after it return [`ReadError::Closed`]. Calling `stop` again, or from
    /// another clone, is harmless.
    pub async fn stop(&self) {
        self.shutdown.notify_one();
        let mut tasks = self.tasks.lock().await;
        for task in tasks.drain(..) {
            // A panicked task has already logged through the runtime.
            let _ = task.await;
        }
        tracing::info!("read batcher stopped");
    }
}
