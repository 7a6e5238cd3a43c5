//! Route type: the ordered leg chain of one trip.

use serde::{Deserialize, Serialize};

use super::{DomainError, Leg, LegSummary};

/// The ordered legs of a trip from origin to destination.
///
/// # Invariants
///
/// - At least one leg
/// - Consecutive legs connect: `legs[i].end() == legs[i + 1].start()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Leg>", into = "Vec<Leg>")]
pub struct Route {
    legs: Vec<Leg>,
}

impl Route {
    /// Constructs a route from legs, checking the chain property.
    ///
    /// # Examples
    ///
    /// ```
    /// use recharge_server::domain::{Leg, Route};
    ///
    /// let legs = vec![
    ///     Leg::new("Home", "S1", 40.0, 25, 6.88, vec![]).unwrap(),
    ///     Leg::new("S1", "Work", 10.0, 8, 1.72, vec![]).unwrap(),
    /// ];
    /// let route = Route::new(legs).unwrap();
    /// assert_eq!(route.origin(), "Home");
    /// assert_eq!(route.destination(), "Work");
    ///
    /// let broken = vec![
    ///     Leg::new("Home", "S1", 40.0, 25, 6.88, vec![]).unwrap(),
    ///     Leg::new("S2", "Work", 10.0, 8, 1.72, vec![]).unwrap(),
    /// ];
    /// assert!(Route::new(broken).is_err());
    /// ```
    pub fn new(legs: Vec<Leg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyRoute);
        }

        for window in legs.windows(2) {
            if window[0].end() != window[1].start() {
                return Err(DomainError::BrokenChain {
                    end: window[0].end().to_string(),
                    start: window[1].start().to_string(),
                });
            }
        }

        Ok(Self { legs })
    }

    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Name of the trip origin.
    pub fn origin(&self) -> &str {
        self.legs[0].start()
    }

    /// Name of the trip destination.
    pub fn destination(&self) -> &str {
        self.legs[self.legs.len() - 1].end()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.legs.iter().map(Leg::distance_km).sum()
    }

    pub fn total_consumption_kwh(&self) -> f64 {
        self.legs.iter().map(Leg::consumed_battery_kwh).sum()
    }

    /// Total driving time in minutes.
    pub fn total_minutes(&self) -> u32 {
        self.legs.iter().map(Leg::consumed_time_min).sum()
    }

    /// Reduced leg descriptions for the plan generator.
    pub fn summaries(&self) -> Vec<LegSummary> {
        self.legs.iter().map(Leg::summary).collect()
    }

    pub fn into_legs(self) -> Vec<Leg> {
        self.legs
    }
}

impl TryFrom<Vec<Leg>> for Route {
    type Error = DomainError;

    fn try_from(legs: Vec<Leg>) -> Result<Self, Self::Error> {
        Route::new(legs)
    }
}

impl From<Route> for Vec<Leg> {
    fn from(route: Route) -> Self {
        route.legs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(start: &str, end: &str, km: f64, mins: u32, kwh: f64) -> Leg {
        Leg::new(start, end, km, mins, kwh, vec![]).unwrap()
    }

    #[test]
    fn empty_route_rejected() {
        assert!(matches!(Route::new(vec![]), Err(DomainError::EmptyRoute)));
    }

    #[test]
    fn broken_chain_names_both_ends() {
        let err = Route::new(vec![leg("A", "B", 1.0, 1, 0.2), leg("C", "D", 1.0, 1, 0.2)])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "leg ending at B is followed by a leg starting at C"
        );
    }

    #[test]
    fn totals() {
        let route = Route::new(vec![
            leg("A", "B", 10.5, 7, 1.81),
            leg("B", "C", 20.0, 13, 3.44),
        ])
        .unwrap();

        assert_eq!(route.len(), 2);
        assert!((route.total_distance_km() - 30.5).abs() < 1e-9);
        assert!((route.total_consumption_kwh() - 5.25).abs() < 1e-9);
        assert_eq!(route.total_minutes(), 20);
        assert_eq!(route.summaries()[1].start, "B");
    }

    #[test]
    fn deserialize_checks_chain() {
        let ok = r#"[
            {"start":"A","end":"B","distanceKm":1.0,"consumedTimeMin":1,"consumedBatteryKwh":0.2},
            {"start":"B","end":"C","distanceKm":1.0,"consumedTimeMin":1,"consumedBatteryKwh":0.2}
        ]"#;
        let route: Route = serde_json::from_str(ok).unwrap();
        assert_eq!(route.destination(), "C");

        let broken = r#"[
            {"start":"A","end":"B","distanceKm":1.0,"consumedTimeMin":1,"consumedBatteryKwh":0.2},
            {"start":"X","end":"C","distanceKm":1.0,"consumedTimeMin":1,"consumedBatteryKwh":0.2}
        ]"#;
        assert!(serde_json::from_str::<Route>(broken).is_err());
        assert!(serde_json::from_str::<Route>("[]").is_err());
    }
}
