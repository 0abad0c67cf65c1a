use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Airline identifiers for the search backends we federate over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Airline {
    VJ,
    VNA,
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Airline::VJ => write!(f, "VietJet Air"),
            Airline::VNA => write!(f, "Vietnam Airlines"),
        }
    }
}

impl Airline {
    pub fn code(&self) -> &'static str {
        match self {
            Airline::VJ => "VJ",
            Airline::VNA => "VNA",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "VJ" => Some(Airline::VJ),
            "VNA" => Some(Airline::VNA),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub depart_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
    pub trip_type: TripType,
}

/// One leg of an itinerary. `stops == 0` means the leg is direct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub airport: String,
    pub date: NaiveDate,
    /// HH:MM, comparable lexicographically within a day.
    pub time: String,
    pub stops: u32,
}

/// Canonical flight record every provider response is normalized into.
/// Immutable once a fetcher has built it; booking keys are opaque and passed
/// through untouched to the booking flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFlight {
    pub id: String,
    pub airline: Airline,
    /// Fare in VND, whole units.
    pub price: u64,
    pub departure: Leg,
    #[serde(rename = "return")]
    pub return_leg: Option<Leg>,
    /// Provider-formatted elapsed time, e.g. "2h 05m".
    pub duration: String,
    /// Fare/baggage class tag as reported by the provider.
    pub baggage_type: String,
    pub available_seats: u32,
    pub booking_key: String,
    pub return_booking_key: Option<String>,
}

impl NormalizedFlight {
    /// Direct means the departure leg has no stops, and for round trips the
    /// return leg must be non-stop as well.
    pub fn is_direct(&self) -> bool {
        self.departure.stops == 0 && self.return_leg.as_ref().map_or(true, |r| r.stops == 0)
    }

    /// Two checked bags come with every VietJet fare, or with Vietnam
    /// Airlines fares in the VFR class.
    pub fn is_two_bag_eligible(&self) -> bool {
        self.airline == Airline::VJ || (self.airline == Airline::VNA && self.baggage_type == "VFR")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Price,
    Duration,
    DepartureTime,
}

/// Display-side filter settings. A plain value: the pipeline reads it, the
/// reveal controller produces relaxed copies, nobody mutates it in place
/// behind the caller's back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub airlines: HashSet<Airline>,
    pub direct_only: bool,
    pub cheapest_only: bool,
    pub two_bag_only: bool,
    pub sort_by: SortBy,
}

impl FilterConfig {
    /// Default configuration at the start of a search: show only the
    /// cheapest direct options first.
    pub fn initial(airlines: HashSet<Airline>, sort_by: SortBy) -> Self {
        Self {
            airlines,
            direct_only: true,
            cheapest_only: true,
            two_bag_only: false,
            sort_by,
        }
    }
}

/// How a fully settled search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    /// Every source answered. Zero matches is still a success.
    Success,
    PartialFailure,
    TotalFailure,
}

/// Accumulating result state for one search invocation. Only the
/// coordinator's merge task writes to it; everyone else sees cloned
/// snapshots.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationState {
    /// Append-only, in arrival order. Each source's batch stays contiguous.
    pub accumulated: Vec<NormalizedFlight>,
    /// Sources that have not yet resolved. Shrinks to empty, never grows.
    pub pending: HashSet<Airline>,
    /// Failure reason per source that failed. Append-only.
    pub errors: HashMap<Airline, String>,
    sources: HashSet<Airline>,
}

impl AggregationState {
    pub fn new(sources: HashSet<Airline>) -> Self {
        Self {
            accumulated: Vec::new(),
            pending: sources.clone(),
            errors: HashMap::new(),
            sources,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }

    /// None while any source is still pending.
    pub fn completion(&self) -> Option<CompletionKind> {
        if !self.pending.is_empty() {
            return None;
        }
        Some(if self.errors.is_empty() {
            CompletionKind::Success
        } else if self.errors.len() == self.sources.len() {
            CompletionKind::TotalFailure
        } else {
            CompletionKind::PartialFailure
        })
    }
}

/// Snapshot emitted after each source resolves.
#[derive(Debug, Clone)]
pub struct SearchUpdate {
    pub state: AggregationState,
    pub done: bool,
}

/// Record of who searched for what, persisted fire-and-forget.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub caller: String,
    pub request: SearchRequest,
    pub timestamp: DateTime<Utc>,
}
