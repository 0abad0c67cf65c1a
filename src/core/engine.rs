use crate::core::coordinator::AggregationCoordinator;
use crate::core::reveal::RevealController;
use crate::core::{
    pipeline, AggregationState, Airline, CompletionKind, FilterConfig, NormalizedFlight, Result,
    SearchRequest, SortBy,
};
use crate::domain::model::AuditEntry;
use crate::domain::ports::{AuditSink, BatchAlert, SourceFetcher};
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;

const DISPLAY_CHANNEL_CAPACITY: usize = 16;
const CONTROL_CHANNEL_CAPACITY: usize = 4;

/// What the presentation layer renders after every change: the filtered and
/// sorted view, per-source failures as informational notes, and whether the
/// "show more results" affordance should be offered.
#[derive(Debug, Clone)]
pub struct DisplayUpdate {
    pub results: Vec<NormalizedFlight>,
    pub errors: HashMap<Airline, String>,
    pub more_available: bool,
    pub done: bool,
    pub completion: Option<CompletionKind>,
}

enum SessionCommand {
    RevealMore,
}

/// Handle to one running search. Dropping it ends the session; the
/// aggregation keeps its own lifecycle.
pub struct SearchSession {
    updates: mpsc::Receiver<DisplayUpdate>,
    control: mpsc::Sender<SessionCommand>,
}

impl SearchSession {
    pub async fn next_update(&mut self) -> Option<DisplayUpdate> {
        self.updates.recv().await
    }

    /// Relaxes the next reduction filter and triggers a re-render from the
    /// already-accumulated results. No new fetch is issued.
    pub async fn reveal_more(&self) {
        let _ = self.control.send(SessionCommand::RevealMore).await;
    }
}

/// Orchestrates one search end to end: authorization, the audit side
/// channel, the concurrent fan-out, and re-evaluation of the display
/// pipeline whenever results or filters change.
pub struct SearchEngine {
    coordinator: AggregationCoordinator,
    audit: Arc<dyn AuditSink>,
}

impl SearchEngine {
    pub fn new(alert: Arc<dyn BatchAlert>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            coordinator: AggregationCoordinator::new(alert),
            audit,
        }
    }

    /// Starts a search over the caller's authorized fetchers. Only the
    /// authorization check can fail here; provider failures surface later as
    /// data inside the display updates.
    pub fn search(
        &self,
        caller: &str,
        request: SearchRequest,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        sort_by: SortBy,
    ) -> Result<SearchSession> {
        let airlines: HashSet<Airline> = fetchers.iter().map(|f| f.airline()).collect();

        let mut aggregation = self.coordinator.search(request.clone(), fetchers)?;

        // Fire-and-forget: a failed audit write is logged, never surfaced.
        let entry = AuditEntry {
            caller: caller.to_string(),
            request,
            timestamp: Utc::now(),
        };
        let sink = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(e) = sink.record(entry).await {
                tracing::warn!("audit record failed: {}", e);
            }
        });

        let (display_tx, display_rx) = mpsc::channel(DISPLAY_CHANNEL_CAPACITY);
        let (control_tx, mut control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);

        tokio::spawn(async move {
            let mut reveal =
                RevealController::new(FilterConfig::initial(airlines.clone(), sort_by));
            let mut state = AggregationState::new(airlines);
            let mut aggregation_done = false;

            loop {
                tokio::select! {
                    update = aggregation.recv(), if !aggregation_done => {
                        match update {
                            Some(update) => {
                                state = update.state;
                                reveal.calibrate(&state.accumulated);
                                if render(&display_tx, &state, &reveal, update.done).await.is_err() {
                                    return;
                                }
                                if update.done {
                                    aggregation_done = true;
                                }
                            }
                            None => aggregation_done = true,
                        }
                    }
                    command = control_rx.recv() => {
                        match command {
                            Some(SessionCommand::RevealMore) => {
                                reveal.advance();
                                let done = state.is_settled();
                                if render(&display_tx, &state, &reveal, done).await.is_err() {
                                    return;
                                }
                            }
                            None => return,
                        }
                    }
                }
            }
        });

        Ok(SearchSession {
            updates: display_rx,
            control: control_tx,
        })
    }
}

async fn render(
    tx: &mpsc::Sender<DisplayUpdate>,
    state: &AggregationState,
    reveal: &RevealController,
    done: bool,
) -> std::result::Result<(), mpsc::error::SendError<DisplayUpdate>> {
    let results = pipeline::evaluate(&state.accumulated, reveal.config());
    // With nothing accumulated there is nothing a relaxation could reveal.
    let more_available = reveal.has_more() && !state.accumulated.is_empty();
    tx.send(DisplayUpdate {
        results,
        errors: state.errors.clone(),
        more_available,
        done,
        completion: state.completion(),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TripType;
    use crate::domain::model::Leg;
    use crate::utils::error::SearchError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;
    use tokio::sync::Mutex;

    struct StubFetcher {
        airline: Airline,
        delay: Duration,
        batch: Vec<NormalizedFlight>,
    }

    #[async_trait]
    impl SourceFetcher for StubFetcher {
        fn airline(&self) -> Airline {
            self.airline
        }

        async fn fetch(&self, _request: &SearchRequest) -> Result<Vec<NormalizedFlight>> {
            tokio::time::sleep(self.delay).await;
            Ok(self.batch.clone())
        }
    }

    struct SilentAlert;

    impl BatchAlert for SilentAlert {
        fn batch_arrived(&self, _airline: Airline, _count: usize) {}
    }

    #[derive(Default)]
    struct CapturingAuditSink {
        entries: Mutex<Vec<AuditEntry>>,
    }

    #[async_trait]
    impl AuditSink for CapturingAuditSink {
        async fn record(&self, entry: AuditEntry) -> Result<()> {
            self.entries.lock().await.push(entry);
            Ok(())
        }
    }

    fn request() -> SearchRequest {
        SearchRequest {
            origin: "SGN".to_string(),
            destination: "HAN".to_string(),
            depart_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            return_date: None,
            adults: 1,
            children: 0,
            infants: 0,
            trip_type: TripType::OneWay,
        }
    }

    fn flight(id: &str, airline: Airline, price: u64, stops: u32) -> NormalizedFlight {
        NormalizedFlight {
            id: id.to_string(),
            airline,
            price,
            departure: Leg {
                airport: "SGN".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                time: "06:00".to_string(),
                stops,
            },
            return_leg: None,
            duration: "2h 05m".to_string(),
            baggage_type: "Eco".to_string(),
            available_seats: 9,
            booking_key: format!("bk-{}", id),
            return_booking_key: None,
        }
    }

    fn engine() -> SearchEngine {
        SearchEngine::new(Arc::new(SilentAlert), Arc::new(CapturingAuditSink::default()))
    }

    fn two_source_fetchers() -> Vec<Arc<dyn SourceFetcher>> {
        vec![
            Arc::new(StubFetcher {
                airline: Airline::VJ,
                delay: Duration::from_millis(50),
                batch: vec![
                    flight("vj1", Airline::VJ, 100, 0),
                    flight("vj2", Airline::VJ, 120, 0),
                    flight("vj3", Airline::VJ, 90, 0),
                ],
            }),
            Arc::new(StubFetcher {
                airline: Airline::VNA,
                delay: Duration::from_millis(200),
                batch: vec![
                    flight("vna1", Airline::VNA, 80, 0),
                    flight("vna2", Airline::VNA, 500, 0),
                ],
            }),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_cheapest_view_across_both_sources() {
        let mut session = engine()
            .search("tester", request(), two_source_fetchers(), SortBy::Price)
            .unwrap();

        let first = session.next_update().await.unwrap();
        assert!(!first.done);
        assert_eq!(first.results.len(), 1);
        assert_eq!(first.results[0].price, 90);

        let second = session.next_update().await.unwrap();
        assert!(second.done);
        let prices: Vec<u64> = second.results.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![80, 90]);
        assert!(second.more_available);
        assert_eq!(second.completion, Some(CompletionKind::Success));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_more_expands_without_refetch() {
        let mut session = engine()
            .search("tester", request(), two_source_fetchers(), SortBy::Price)
            .unwrap();

        session.next_update().await.unwrap();
        let settled = session.next_update().await.unwrap();
        assert_eq!(settled.results.len(), 2);

        session.reveal_more().await;
        let relaxed = session.next_update().await.unwrap();
        let prices: Vec<u64> = relaxed.results.iter().map(|f| f.price).collect();
        assert_eq!(prices, vec![80, 90, 100, 120, 500]);
        assert!(relaxed.more_available);

        session.reveal_more().await;
        let fully_relaxed = session.next_update().await.unwrap();
        assert_eq!(fully_relaxed.results.len(), 5);
        assert!(!fully_relaxed.more_available);
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_only_auto_relaxes_when_nothing_is_direct() {
        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(StubFetcher {
            airline: Airline::VJ,
            delay: Duration::from_millis(10),
            batch: vec![
                flight("vj1", Airline::VJ, 100, 1),
                flight("vj2", Airline::VJ, 90, 2),
            ],
        })];

        let mut session = engine()
            .search("tester", request(), fetchers, SortBy::Price)
            .unwrap();

        let update = session.next_update().await.unwrap();
        assert!(update.done);
        // Without calibration the direct filter would hide everything.
        assert_eq!(update.results.len(), 1);
        assert_eq!(update.results[0].price, 90);
    }

    #[tokio::test(start_paused = true)]
    async fn test_total_failure_renders_empty_with_no_reveal_affordance() {
        struct FailingFetcher(Airline);

        #[async_trait]
        impl SourceFetcher for FailingFetcher {
            fn airline(&self) -> Airline {
                self.0
            }

            async fn fetch(&self, _request: &SearchRequest) -> Result<Vec<NormalizedFlight>> {
                Err(SearchError::ProviderStatusError { status: 503 })
            }
        }

        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(FailingFetcher(Airline::VJ)),
            Arc::new(FailingFetcher(Airline::VNA)),
        ];

        let mut session = engine()
            .search("tester", request(), fetchers, SortBy::Price)
            .unwrap();

        let mut last = None;
        while let Some(update) = session.next_update().await {
            let done = update.done;
            last = Some(update);
            if done {
                break;
            }
        }
        let last = last.unwrap();
        assert!(last.results.is_empty());
        assert_eq!(last.errors.len(), 2);
        assert!(!last.more_available);
        assert_eq!(last.completion, Some(CompletionKind::TotalFailure));
    }

    #[tokio::test]
    async fn test_no_authorized_sources_is_refused() {
        let result = engine().search("tester", request(), Vec::new(), SortBy::Price);
        assert!(matches!(result, Err(SearchError::NoSourcesAuthorized)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_audit_entry_is_recorded() {
        let audit = Arc::new(CapturingAuditSink::default());
        let engine = SearchEngine::new(Arc::new(SilentAlert), audit.clone());

        let fetchers: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(StubFetcher {
            airline: Airline::VJ,
            delay: Duration::from_millis(10),
            batch: Vec::new(),
        })];

        let mut session = engine
            .search("agent-42", request(), fetchers, SortBy::Price)
            .unwrap();
        while let Some(update) = session.next_update().await {
            if update.done {
                break;
            }
        }

        let entries = audit.entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].caller, "agent-42");
        assert_eq!(entries[0].request.origin, "SGN");
    }
}
