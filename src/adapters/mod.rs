// Adapters layer: concrete implementations of the domain ports for external
// systems (provider APIs, alerting, audit persistence).

pub mod alert;
pub mod audit;
pub mod vietjet;
pub mod vietnam_airlines;

pub use alert::LogAlert;
pub use audit::{FileAuditSink, NullAuditSink};
pub use vietjet::VietJetFetcher;
pub use vietnam_airlines::VietnamAirlinesFetcher;
