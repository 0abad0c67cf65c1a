use crate::core::{FilterConfig, NormalizedFlight};

/// Linear "show more results" ladder over the filter configuration.
///
/// A fresh controller starts at the most reduced view (cheapest per airline,
/// direct flights only). Each `advance` relaxes one constraint, cheapest
/// first; once both reduction flags are cleared further calls do nothing and
/// the affordance is withdrawn.
#[derive(Debug, Clone)]
pub struct RevealController {
    config: FilterConfig,
}

impl RevealController {
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Relaxes the next constraint in the fixed order. No-op at the
    /// terminal state.
    pub fn advance(&mut self) {
        if self.config.cheapest_only {
            self.config.cheapest_only = false;
        } else if self.config.direct_only {
            self.config.direct_only = false;
        }
    }

    /// True while a further `advance` would reveal more results.
    pub fn has_more(&self) -> bool {
        self.config.cheapest_only || self.config.direct_only
    }

    /// Silently drops constraints no flight in the result set can satisfy,
    /// so the first render never filters everything away. Called once per
    /// fresh result set, before rendering.
    pub fn calibrate(&mut self, flights: &[NormalizedFlight]) {
        if self.config.direct_only && !flights.iter().any(|f| f.is_direct()) {
            tracing::debug!("no direct flights available, relaxing direct-only filter");
            self.config.direct_only = false;
        }
        if self.config.two_bag_only && !flights.iter().any(|f| f.is_two_bag_eligible()) {
            tracing::debug!("no two-bag fares available, relaxing two-bag filter");
            self.config.two_bag_only = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Airline, Leg, SortBy};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn controller() -> RevealController {
        let airlines: HashSet<Airline> = [Airline::VJ, Airline::VNA].into_iter().collect();
        RevealController::new(FilterConfig::initial(airlines, SortBy::Price))
    }

    fn flight(airline: Airline, baggage: &str, stops: u32) -> NormalizedFlight {
        NormalizedFlight {
            id: "f".to_string(),
            airline,
            price: 100,
            departure: Leg {
                airport: "SGN".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
                time: "06:00".to_string(),
                stops,
            },
            return_leg: None,
            duration: "2h".to_string(),
            baggage_type: baggage.to_string(),
            available_seats: 4,
            booking_key: "bk".to_string(),
            return_booking_key: None,
        }
    }

    #[test]
    fn test_advance_relaxes_cheapest_before_direct() {
        let mut ctl = controller();
        assert!(ctl.config().cheapest_only);
        assert!(ctl.config().direct_only);
        assert!(ctl.has_more());

        ctl.advance();
        assert!(!ctl.config().cheapest_only);
        assert!(ctl.config().direct_only);
        assert!(ctl.has_more());

        ctl.advance();
        assert!(!ctl.config().cheapest_only);
        assert!(!ctl.config().direct_only);
        assert!(!ctl.has_more());
    }

    #[test]
    fn test_advance_is_idempotent_at_terminal_state() {
        let mut ctl = controller();
        ctl.advance();
        ctl.advance();
        let settled = ctl.config().clone();

        ctl.advance();
        assert_eq!(ctl.config(), &settled);
        assert!(!ctl.has_more());
    }

    #[test]
    fn test_calibrate_relaxes_direct_when_nothing_is_direct() {
        let mut ctl = controller();
        let flights = vec![
            flight(Airline::VJ, "Eco", 1),
            flight(Airline::VNA, "VFR", 2),
        ];
        ctl.calibrate(&flights);
        assert!(!ctl.config().direct_only);
        // Cheapest reduction is capability-independent and stays on.
        assert!(ctl.config().cheapest_only);
    }

    #[test]
    fn test_calibrate_relaxes_two_bag_when_no_eligible_fare() {
        let mut ctl = controller();
        let mut config = ctl.config().clone();
        config.two_bag_only = true;
        ctl = RevealController::new(config);

        let flights = vec![flight(Airline::VNA, "Business", 0)];
        ctl.calibrate(&flights);
        assert!(!ctl.config().two_bag_only);
    }

    #[test]
    fn test_calibrate_keeps_satisfiable_constraints() {
        let mut ctl = controller();
        let flights = vec![flight(Airline::VJ, "Eco", 0)];
        ctl.calibrate(&flights);
        assert!(ctl.config().direct_only);
        assert!(ctl.config().cheapest_only);
    }
}
