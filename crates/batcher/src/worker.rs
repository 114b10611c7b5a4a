//! The worker pool: one store query per batch, one outcome per request.

use std::sync::Arc;

use store::{KeyValueStore, Row};
use tokio::sync::{Mutex, mpsc};

use crate::request::Batch;

/// The flushed-batch queue shared by the pool. Tokio's mpsc receiver is
/// single-consumer, so workers take turns on it through a mutex held only
/// across the dequeue; batch resolution itself shares nothing between
/// workers.
pub(crate) type BatchQueue = Arc<Mutex<mpsc::Receiver<Batch>>>;

/// One worker: pull batches until the queue closes and is drained.
pub(crate) async fn run<S: KeyValueStore>(store: Arc<S>, queue: BatchQueue) {
    loop {
        let batch = {
            let mut queue = queue.lock().await;
            queue.recv().await
        };
        let Some(batch) = batch else { return };
        resolve(store.as_ref(), batch).await;
    }
}

/// Resolves every request of `batch` with a single `multi_get`.
///
/// Keys are passed through as-is; duplicates inside a batch each resolve
/// independently to the same entry. On a store failure the whole batch
/// receives the same cause, so no request is left unresolved. A reply send
/// can only fail when the caller has stopped waiting; that outcome is
/// discarded.
pub(crate) async fn resolve<S: KeyValueStore + ?Sized>(store: &S, batch: Batch) {
    let keys: Vec<String> = batch.iter().map(|request| request.key.clone()).collect();

    match store.multi_get(&keys).await {
        Ok(found) => {
            for request in batch {
                let row = found
                    .get(&request.key)
                    .map(|payload| Row::new(request.key.clone(), payload.clone()));
                let _ = request.reply.send(Ok(row));
            }
        }
        Err(cause) => {
            tracing::warn!(error = %cause, batch_len = keys.len(), "multi-key read failed");
            metrics::counter!("batcher_store_errors_total").increment(1);
            for request in batch {
                let _ = request.reply.send(Err(cause.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ReadOutcome, ReadRequest};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use store::{InMemoryStore, StoreError};
    use tokio::sync::oneshot;

    struct FailingStore;

    #[async_trait]
    impl KeyValueStore for FailingStore {
        async fn multi_get(&self, _keys: &[String]) -> store::Result<HashMap<String, String>> {
            Err(StoreError::Unavailable("connection refused".to_string()))
        }
    }

    fn request(key: &str) -> (ReadRequest, oneshot::Receiver<ReadOutcome>) {
        let (reply, rx) = oneshot::channel();
        (
            ReadRequest {
                key: key.to_string(),
                reply,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn resolves_found_and_not_found() {
        let store = InMemoryStore::new();
        store.insert("k1", "v1").await;

        let (r1, rx1) = request("k1");
        let (r2, rx2) = request("k2");
        resolve(&store, vec![r1, r2]).await;

        let found = rx1.await.unwrap().unwrap();
        assert_eq!(found, Some(Row::new("k1", "v1")));
        let missing = rx2.await.unwrap().unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn store_failure_fails_every_request_with_same_cause() {
        let (r1, rx1) = request("k1");
        let (r2, rx2) = request("k2");
        let (r3, rx3) = request("k3");
        resolve(&FailingStore, vec![r1, r2, r3]).await;

        for rx in [rx1, rx2, rx3] {
            let outcome = rx.await.unwrap();
            let err = outcome.unwrap_err();
            assert!(matches!(&err, StoreError::Unavailable(msg) if msg == "connection refused"));
        }
    }

    #[tokio::test]
    async fn duplicate_keys_each_resolved_independently() {
        let store = InMemoryStore::new();
        store.insert("k1", "v1").await;

        let (r1, rx1) = request("k1");
        let (r2, rx2) = request("k1");
        let (r3, rx3) = request("k1");
        resolve(&store, vec![r1, r2, r3]).await;

        for rx in [rx1, rx2, rx3] {
            let row = rx.await.unwrap().unwrap();
            assert_eq!(row, Some(Row::new("k1", "v1")));
        }
    }

    #[tokio::test]
    async fn departed_caller_does_not_disturb_the_rest() {
        let store = InMemoryStore::new();
        store.insert("k1", "v1").await;
        store.insert("k2", "v2").await;

        let (r1, rx1) = request("k1");
        let (r2, rx2) = request("k2");
        drop(rx1); // caller timed out and went away
        resolve(&store, vec![r1, r2]).await;

        let row = rx2.await.unwrap().unwrap();
        assert_eq!(row, Some(Row::new("k2", "v2")));
    }

    #[tokio::test]
    async fn workers_drain_queue_and_exit_on_close() {
        let store = Arc::new(InMemoryStore::new());
        store.insert("k1", "v1").await;

        let (batches_tx, batches_rx) = mpsc::channel(4);
        let queue: BatchQueue = Arc::new(Mutex::new(batches_rx));
        let workers: Vec<_> = (0..2)
            .map(|_| tokio::spawn(run(Arc::clone(&store), Arc::clone(&queue))))
            .collect();

        let (r1, rx1) = request("k1");
        let (r2, rx2) = request("k1");
        batches_tx.send(vec![r1]).await.unwrap();
        batches_tx.send(vec![r2]).await.unwrap();
        drop(batches_tx);

        for worker in workers {
            worker.await.unwrap();
        }
        assert!(rx1.await.unwrap().unwrap().is_some());
        assert!(rx2.await.unwrap().unwrap().is_some());
    }
}
