use crate::core::{FilterConfig, NormalizedFlight, SortBy};
use regex::Regex;
use std::sync::OnceLock;

/// Filters, reduces and sorts the accumulated flights for display.
///
/// Pure function of its inputs; stage order is significant. Filters narrow
/// the set, the cheapest-only stage collapses each airline group to its
/// minimum-price member, and the final stable sort imposes display order.
pub fn evaluate(flights: &[NormalizedFlight], config: &FilterConfig) -> Vec<NormalizedFlight> {
    let mut out: Vec<NormalizedFlight> = flights
        .iter()
        .filter(|f| config.airlines.contains(&f.airline))
        .cloned()
        .collect();

    if config.direct_only {
        out.retain(|f| f.is_direct());
    }

    if config.two_bag_only {
        out.retain(|f| f.is_two_bag_eligible());
    }

    if config.cheapest_only {
        out = cheapest_per_airline(out);
    }

    match config.sort_by {
        SortBy::Price => out.sort_by_key(|f| f.price),
        SortBy::Duration => out.sort_by_key(|f| duration_key(&f.duration)),
        SortBy::DepartureTime => out.sort_by(|a, b| a.departure.time.cmp(&b.departure.time)),
    }

    out
}

/// Keeps the minimum-price flight per airline. The first-encountered flight
/// wins price ties and anchors the group's position.
fn cheapest_per_airline(flights: Vec<NormalizedFlight>) -> Vec<NormalizedFlight> {
    let mut kept: Vec<NormalizedFlight> = Vec::new();
    for flight in flights {
        match kept.iter_mut().find(|k| k.airline == flight.airline) {
            Some(current) => {
                if flight.price < current.price {
                    *current = flight;
                }
            }
            None => kept.push(flight),
        }
    }
    kept
}

/// Numeric ordering key for provider-formatted durations: digits only, so
/// "2h 05m" sorts as 205.
fn duration_key(duration: &str) -> u64 {
    static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGIT.get_or_init(|| Regex::new(r"\D+").expect("static pattern"));
    re.replace_all(duration, "").parse().unwrap_or(0)
}
