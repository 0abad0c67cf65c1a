use crate::core::Airline;
use crate::domain::ports::BatchAlert;

/// Batch-arrival alert that goes to the log. A richer UI can swap in a
/// sound or toast implementation behind the same port.
pub struct LogAlert;

impl BatchAlert for LogAlert {
    fn batch_arrived(&self, airline: Airline, count: usize) {
        tracing::info!("🔔 {}: {} new flights", airline, count);
    }
}
