pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{FileAuditSink, LogAlert, NullAuditSink, VietJetFetcher, VietnamAirlinesFetcher};
pub use config::{toml_config::EndpointsConfig, CliConfig};
pub use core::coordinator::AggregationCoordinator;
pub use core::engine::{DisplayUpdate, SearchEngine, SearchSession};
pub use core::reveal::RevealController;
pub use domain::model::{
    AggregationState, Airline, CompletionKind, FilterConfig, Leg, NormalizedFlight, SearchRequest,
    SortBy, TripType,
};
pub use domain::ports::{AuditSink, BatchAlert, SourceFetcher};
pub use utils::error::{Result, SearchError};
