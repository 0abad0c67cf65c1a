pub mod toml_config;

use crate::core::{Airline, SearchRequest, SortBy, TripType};
use crate::utils::error::{Result, SearchError};
use crate::utils::validation::{
    validate_airport_code, validate_non_empty_string, validate_positive_number, Validate,
};
use chrono::NaiveDate;
use clap::Parser;
use std::collections::HashSet;

#[derive(Debug, Clone, Parser)]
#[command(name = "skysearch")]
#[command(about = "Concurrent flight search across VietJet Air and Vietnam Airlines")]
pub struct CliConfig {
    #[arg(long, help = "Origin airport code, e.g. SGN")]
    pub origin: String,

    #[arg(long, help = "Destination airport code, e.g. HAN")]
    pub destination: String,

    #[arg(long, help = "Departure date (YYYY-MM-DD)")]
    pub depart_date: NaiveDate,

    #[arg(long, help = "Return date; presence makes the search round-trip")]
    pub return_date: Option<NaiveDate>,

    #[arg(long, default_value = "1")]
    pub adults: u32,

    #[arg(long, default_value = "0")]
    pub children: u32,

    #[arg(long, default_value = "0")]
    pub infants: u32,

    #[arg(long, default_value = "price", help = "price, duration or departure-time")]
    pub sort: String,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "VJ,VNA",
        help = "Sources this caller may query"
    )]
    pub sources: Vec<String>,

    #[arg(long, default_value = "endpoints.toml")]
    pub endpoints_file: String,

    #[arg(long, default_value = "search_audit.jsonl")]
    pub audit_log: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            origin: self.origin.to_ascii_uppercase(),
            destination: self.destination.to_ascii_uppercase(),
            depart_date: self.depart_date,
            return_date: self.return_date,
            adults: self.adults,
            children: self.children,
            infants: self.infants,
            trip_type: if self.return_date.is_some() {
                TripType::RoundTrip
            } else {
                TripType::OneWay
            },
        }
    }

    pub fn sort_by(&self) -> Result<SortBy> {
        match self.sort.as_str() {
            "price" => Ok(SortBy::Price),
            "duration" => Ok(SortBy::Duration),
            "departure-time" => Ok(SortBy::DepartureTime),
            other => Err(SearchError::InvalidConfigValueError {
                field: "sort".to_string(),
                value: other.to_string(),
                reason: "Expected price, duration or departure-time".to_string(),
            }),
        }
    }

    /// Sources the caller is permitted to query. Unknown codes are a
    /// configuration error rather than being silently ignored.
    pub fn permitted_sources(&self) -> Result<HashSet<Airline>> {
        let mut permitted = HashSet::new();
        for code in &self.sources {
            match Airline::from_code(code) {
                Some(airline) => {
                    permitted.insert(airline);
                }
                None => {
                    return Err(SearchError::InvalidConfigValueError {
                        field: "sources".to_string(),
                        value: code.clone(),
                        reason: "Known sources are VJ and VNA".to_string(),
                    })
                }
            }
        }
        Ok(permitted)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_airport_code("origin", &self.origin)?;
        validate_airport_code("destination", &self.destination)?;
        validate_positive_number("adults", self.adults, 1)?;
        validate_non_empty_string("endpoints_file", &self.endpoints_file)?;
        self.sort_by()?;
        self.permitted_sources()?;
        Ok(())
    }
}
