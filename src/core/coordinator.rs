use crate::core::{
    AggregationState, Airline, NormalizedFlight, Result, SearchRequest, SearchUpdate,
};
use crate::domain::ports::{BatchAlert, SourceFetcher};
use crate::utils::error::SearchError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

const UPDATE_CHANNEL_CAPACITY: usize = 16;

enum SourceOutcome {
    Batch(Airline, Vec<NormalizedFlight>),
    Failed(Airline, String),
}

/// Fans one search request out to every authorized source in parallel and
/// merges batches as they arrive.
///
/// Each fetch runs as its own task; results funnel through a channel into a
/// single merge task, so the aggregation state has exactly one writer and
/// needs no locks. A source failure is recorded as data and never blocks or
/// aborts its siblings. Subscribers receive a cloned snapshot after every
/// resolution, with `done` set when the last source settles.
pub struct AggregationCoordinator {
    alert: Arc<dyn BatchAlert>,
    session: Arc<AtomicU64>,
}

impl AggregationCoordinator {
    pub fn new(alert: Arc<dyn BatchAlert>) -> Self {
        Self {
            alert,
            session: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts the fan-out and returns the update stream. Fails fast, before
    /// any fetch, when no sources are authorized.
    ///
    /// Starting a new search supersedes any still-pending one: the stale
    /// merge task notices its session is no longer current and discards
    /// late-arriving batches instead of mixing them into the new state. The
    /// underlying provider calls are not forcibly aborted.
    pub fn search(
        &self,
        request: SearchRequest,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
    ) -> Result<mpsc::Receiver<SearchUpdate>> {
        if fetchers.is_empty() {
            return Err(SearchError::NoSourcesAuthorized);
        }

        let session_id = self.session.fetch_add(1, Ordering::SeqCst) + 1;
        let current_session = Arc::clone(&self.session);
        let sources: HashSet<Airline> = fetchers.iter().map(|f| f.airline()).collect();

        let (update_tx, update_rx) = mpsc::channel(UPDATE_CHANNEL_CAPACITY);
        let (merge_tx, mut merge_rx) = mpsc::channel::<SourceOutcome>(fetchers.len());

        for fetcher in fetchers {
            let tx = merge_tx.clone();
            let request = request.clone();
            tokio::spawn(async move {
                let airline = fetcher.airline();
                tracing::debug!("📡 {}: fetch started", airline);
                let outcome = match fetcher.fetch(&request).await {
                    Ok(batch) => SourceOutcome::Batch(airline, batch),
                    Err(e) => SourceOutcome::Failed(airline, e.to_string()),
                };
                // Receiver gone means the search was dropped; nothing to do.
                let _ = tx.send(outcome).await;
            });
        }
        drop(merge_tx);

        let alert = Arc::clone(&self.alert);
        tokio::spawn(async move {
            let mut state = AggregationState::new(sources);
            while let Some(outcome) = merge_rx.recv().await {
                if current_session.load(Ordering::SeqCst) != session_id {
                    tracing::debug!("discarding result from superseded search");
                    return;
                }
                match outcome {
                    SourceOutcome::Batch(airline, batch) => {
                        // At most one terminal outcome per source.
                        if !state.pending.remove(&airline) {
                            continue;
                        }
                        if !batch.is_empty() {
                            alert.batch_arrived(airline, batch.len());
                        }
                        tracing::info!("📡 {}: {} flights received", airline, batch.len());
                        state.accumulated.extend(batch);
                    }
                    SourceOutcome::Failed(airline, reason) => {
                        if !state.pending.remove(&airline) {
                            continue;
                        }
                        tracing::warn!("❌ {}: fetch failed: {}", airline, reason);
                        state.errors.insert(airline, reason);
                    }
                }
                let done = state.is_settled();
                let update = SearchUpdate {
                    state: state.clone(),
                    done,
                };
                if update_tx.send(update).await.is_err() {
                    return;
                }
            }
        });

        Ok(update_rx)
    }
}
