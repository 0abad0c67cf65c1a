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

/// Vietnam Airlines search client. The provider wraps results in a status
/// envelope and reports legs with its own field names; everything is mapped
/// to the canonical record here.
pub struct VietnamAirlinesFetcher {
    client: Client,
    endpoint: String,
    timeout: Option<Duration>,
    headers: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct VnaResponse {
    status: String,
    data: Option<VnaData>,
}

#[derive(Debug, Deserialize)]
struct VnaData {
    itineraries: Vec<VnaItinerary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VnaItinerary {
    id: String,
    total_price: u64,
    outbound: VnaSegment,
    inbound: Option<VnaSegment>,
    elapsed_time: String,
    fare_family: String,
    remaining_seats: u32,
    ticket_token: String,
    inbound_ticket_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VnaSegment {
    origin: String,
    departure_date: NaiveDate,
    departure_time: String,
    stop_count: u32,
}

impl VietnamAirlinesFetcher {
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
            ("origin".to_string(), request.origin.clone()),
            ("destination".to_string(), request.destination.clone()),
            ("departureDate".to_string(), request.depart_date.to_string()),
            ("adt".to_string(), request.adults.to_string()),
            ("chd".to_string(), request.children.to_string()),
            ("inf".to_string(), request.infants.to_string()),
        ];
        if let Some(return_date) = request.return_date {
            params.push(("returnDate".to_string(), return_date.to_string()));
        }
        params
    }
}

impl VnaSegment {
    fn normalize(self) -> Leg {
        Leg {
            airport: self.origin,
            date: self.departure_date,
            time: self.departure_time,
            stops: self.stop_count,
        }
    }
}

impl VnaItinerary {
    fn normalize(self) -> NormalizedFlight {
        NormalizedFlight {
            id: format!("VNA-{}", self.id),
            airline: Airline::VNA,
            price: self.total_price,
            departure: self.outbound.normalize(),
            return_leg: self.inbound.map(VnaSegment::normalize),
            duration: self.elapsed_time,
            baggage_type: self.fare_family,
            available_seats: self.remaining_seats,
            booking_key: self.ticket_token,
            return_booking_key: self.inbound_ticket_token,
        }
    }
}

#[async_trait]
impl SourceFetcher for VietnamAirlinesFetcher {
    fn airline(&self) -> Airline {
        Airline::VNA
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
        tracing::debug!("📡 Vietnam Airlines response status: {}", response.status());
        if !response.status().is_success() {
            return Err(SearchError::ProviderStatusError {
                status: response.status().as_u16(),
            });
        }

        let payload: VnaResponse = response.json().await?;
        if payload.status != "OK" {
            return Err(SearchError::MalformedResponseError {
                message: format!("provider reported status {}", payload.status),
            });
        }

        let itineraries = payload.data.map(|d| d.itineraries).unwrap_or_default();
        Ok(itineraries.into_iter().map(VnaItinerary::normalize).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TripType;
    use httpmock::prelude::*;

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

    fn fetcher(url: String) -> VietnamAirlinesFetcher {
        VietnamAirlinesFetcher::new(&SourceEndpoint {
            endpoint: url,
            timeout_seconds: None,
            headers: None,
        })
    }

    #[tokio::test]
    async fn test_fetch_normalizes_enveloped_payload() {
        let server = MockServer::start();
        let body = serde_json::json!({
            "status": "OK",
            "data": {
                "itineraries": [{
                    "id": "VN246-20260901",
                    "totalPrice": 1600000,
                    "outbound": {
                        "origin": "SGN",
                        "departureDate": "2026-09-01",
                        "departureTime": "07:30",
                        "stopCount": 0
                    },
                    "inbound": null,
                    "elapsedTime": "2h 10m",
                    "fareFamily": "VFR",
                    "remainingSeats": 4,
                    "ticketToken": "vna-tok-1",
                    "inboundTicketToken": null
                }]
            }
        });

        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/offers")
                .query_param("origin", "SGN")
                .query_param("destination", "HAN");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(body);
        });

        let flights = fetcher(server.url("/offers")).fetch(&request()).await.unwrap();

        api_mock.assert();
        assert_eq!(flights.len(), 1);
        let flight = &flights[0];
        assert_eq!(flight.airline, Airline::VNA);
        assert_eq!(flight.price, 1_600_000);
        assert_eq!(flight.baggage_type, "VFR");
        assert_eq!(flight.departure.time, "07:30");
        assert_eq!(flight.booking_key, "vna-tok-1");
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_envelope() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/offers");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"status": "FARE_ENGINE_DOWN", "data": null}));
        });

        let result = fetcher(server.url("/offers")).fetch(&request()).await;

        api_mock.assert();
        assert!(matches!(
            result,
            Err(SearchError::MalformedResponseError { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_failure() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/offers");
            then.status(500);
        });

        let result = fetcher(server.url("/offers")).fetch(&request()).await;

        api_mock.assert();
        assert!(matches!(
            result,
            Err(SearchError::ProviderStatusError { status: 500 })
        ));
    }
}
