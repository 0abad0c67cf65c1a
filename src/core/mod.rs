pub mod coordinator;
pub mod engine;
pub mod pipeline;
pub mod reveal;

pub use crate::domain::model::{
    AggregationState, Airline, CompletionKind, FilterConfig, NormalizedFlight, SearchRequest,
    SearchUpdate, SortBy, TripType,
};
pub use crate::utils::error::Result;
