use crate::domain::model::{Airline, AuditEntry, NormalizedFlight, SearchRequest};
use crate::utils::error::Result;
use async_trait::async_trait;

/// One airline search backend. Implementations normalize their provider's
/// response shape into `NormalizedFlight` before returning.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    fn airline(&self) -> Airline;
    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<NormalizedFlight>>;
}

/// One-shot signal fired when a source delivers a non-empty batch.
pub trait BatchAlert: Send + Sync {
    fn batch_arrived(&self, airline: Airline, count: usize);
}

/// Persists search audit records. Callers fire and forget; a sink failure
/// must never affect the search itself.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}
