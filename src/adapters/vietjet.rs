use crate::config::toml_config::SourceEndpoint;
use crate::core::{Airline, NormalizedFlight, Result, SearchRequest};
use crate::domain::model::Leg;
use crate::domain::ports::SourceFetcher;
use crate::utils::error::SearchError;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// VietJet Air search client. Normalizes the provider's response shape at
/// this boundary; nothing downstream sees VietJet-specific fields.
pub struct VietJetFetcher {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct VietJetResponse {
    flights: Vec<VietJetFlight>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VietJetFlight {
    flight_code: String,
    fare: u64,
    departure: VietJetLeg,
    return_flight: Option<VietJetLeg>,
    duration_text: String,
    fare_class: String,
    seats_left: u32,
    booking_key: String,
    return_booking_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VietJetLeg {
    airport: String,
    date: NaiveDate,
    time: String,
    stops: u32,
}

impl VietJetFetcher {
    pub fn new(config: &SourceEndpoint) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            timeout: config.timeout_seconds.map(Duration::from_secs),
            headers: config.headers.clone().unwrap_or_default(),
        }
    }

    fn query_params(request: &SearchRequest) -> Vec<(String, String)> {
        let mut params = vec![
            ("from".to_string(), request.origin.clone()),
            ("to".to_string(), request.destination.clone()),
            ("departDate".to_string(), request.depart_date.to_string()),
            ("adults".to_string(), request.adults.to_string()),
            ("children".to_string(), request.children.to_string()),
            ("infants".to_string(), request.infants.to_string()),
        ];
        if let Some(return_date) = request.return_date {
            params.push(("returnDate".to_string(), return_date.to_string()));
        }
        params
    }
}

impl VietJetLeg {
    fn normalize(self) -> Leg {
        Leg {
            airport: self.airport,
            date: self.date,
            time: self.time,
            stops: self.stops,
        }
    }
}

impl VietJetFlight {
    fn normalize(self) -> NormalizedFlight {
        NormalizedFlight {
            id: format!("VJ-{}-{}", self.flight_code, self.departure.date),
            airline: Airline::VJ,
            price: self.fare,
            departure: self.departure.normalize(),
            return_leg: self.return_flight.map(VietJetLeg::normalize),
            duration: self.duration_text,
            baggage_type: self.fare_class,
            available_seats: self.seats_left,
            booking_key: self.booking_key,
            return_booking_key: self.return_booking_key,
        }
    }
}

#[async_trait]
impl SourceFetcher for VietJetFetcher {
    fn airline(&self) -> Airline {
        Airline::VJ
    }

    async fn fetch(&self, request: &SearchRequest) -> Result<Vec<NormalizedFlight>> {
        let mut builder = self
            .client
            .get(&self.endpoint)
            .query(&Self::query_params(request));
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        tracing::debug!("📡 VietJet response status: {}", response.status());
        if !response.status().is_success() {
            return Err(SearchError::ProviderStatusError {
                status: response.status().as_u16(),
            });
        }

        let payload: VietJetResponse = response.json().await?;
        Ok(payload
            .flights
            .into_iter()
            .map(VietJetFlight::normalize)
            .collect())
    }
}
