//! Plan verification.
//!
//! Replays a candidate recharging plan against the costed legs and checks
//! every figure the plan states. The first disagreement becomes a
//! [`Violation`] whose message is sent back to the generator verbatim, so
//! the messages are written for the model to act on.

use crate::domain::{ClockTime, Leg, PlanStep, Route, names_match};

use super::config::{Tolerances, VehicleConfig};
use super::energy::round_to;

/// When and with how much charge the trip starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripStart {
    pub time: ClockTime,
    pub soc_percent: f64,
}

/// A check the plan failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("The journey from {from} to {to} can not be found in the route data")]
    UnknownSpan { from: String, to: String },

    #[error(
        "The hard minimal allowed Soc is {hard_min}%, but according to your plan, the remaining Soc from {from} to {to} will be under {hard_min}%"
    )]
    BelowFloor {
        from: String,
        to: String,
        hard_min: f64,
    },

    #[error(
        "The backup service stop should be after the arrival stop, but according to your plan, backup stop {backup} is before arrival stop {arrival}"
    )]
    BackupBeforeArrival { backup: String, arrival: String },

    #[error(
        "The hard minimal allowed Soc is {hard_min}%, but according to your plan, the remaining Soc from {from} to backup stop {backup} will be under {hard_min}%"
    )]
    BackupBelowFloor {
        from: String,
        backup: String,
        hard_min: f64,
    },

    #[error(
        "The Soc at {stop} must stay within 0% and 100% and can not drop while recharging, but according to your plan it goes from {before}% to {after}%"
    )]
    InvalidSoc { stop: String, before: f64, after: f64 },

    #[error("The {field} {value:?} at {stop} is not a valid HH:MM time")]
    InvalidTime {
        stop: String,
        field: &'static str,
        value: String,
    },

    #[error(
        "Comparing to the actually calculated result, there is {deviation} minutes deviation on arrival time from {from} to {to} according to your plan"
    )]
    ArrivalTime {
        from: String,
        to: String,
        deviation: i64,
    },

    #[error(
        "Comparing to the actually calculated result, there is {deviation:.2} Kwh deviation on left battery when arrival at {stop} according to your plan"
    )]
    ArrivalSoc { stop: String, deviation: f64 },

    #[error(
        "Comparing to the actually calculated result, there is {deviation} minutes deviation on recharging time when recharging at {stop} according to your plan"
    )]
    RechargeTime { stop: String, deviation: i64 },

    #[error(
        "Comparing to the actually calculated result, there is {deviation} minutes deviation on departure time when departing {stop} according to your plan"
    )]
    DepartureTime { stop: String, deviation: i64 },
}

/// A contiguous run of legs between two named stops.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Span {
    /// Index of the last leg of the run.
    last: usize,
    kwh: f64,
    minutes: i64,
}

/// The legs from the first leg leaving `from` up to the first later leg
/// arriving at `to`. Names match exactly or by group key.
fn find_span(legs: &[Leg], from: &str, to: &str) -> Option<Span> {
    let first = legs.iter().position(|l| names_match(from, l.start()))?;
    let offset = legs[first..]
        .iter()
        .position(|l| names_match(to, l.end()))?;
    let run = &legs[first..=first + offset];

    Some(Span {
        last: first + offset,
        kwh: run.iter().map(Leg::consumed_battery_kwh).sum(),
        minutes: run.iter().map(|l| l.consumed_time_min() as i64).sum(),
    })
}

/// Simulated battery and clock while replaying a plan.
///
/// `elapsed` counts minutes from the start-day midnight and keeps growing
/// past 24 h; clock comparisons wrap.
#[derive(Debug, Clone, Copy)]
struct SimulationState {
    elapsed: i64,
    remaining_kwh: f64,
}

/// Checks candidate plans against the vehicle model.
pub struct PlanVerifier<'a> {
    vehicle: &'a VehicleConfig,
    tolerances: &'a Tolerances,
}

impl<'a> PlanVerifier<'a> {
    pub fn new(vehicle: &'a VehicleConfig, tolerances: &'a Tolerances) -> Self {
        Self {
            vehicle,
            tolerances,
        }
    }

    /// Replay `plan` over `route`, returning the first violated check.
    pub fn verify(
        &self,
        plan: &[PlanStep],
        route: &Route,
        start: TripStart,
    ) -> Result<(), Violation> {
        let mut state = SimulationState {
            elapsed: start.time.minutes_of_day(),
            remaining_kwh: self.vehicle.soc_to_kwh(start.soc_percent),
        };

        for step in plan {
            self.verify_step(step, route.legs(), &mut state)?;
        }

        let last_stop = plan
            .last()
            .map_or(route.origin(), |s| s.arrival_stop.as_str());
        if last_stop != route.destination() {
            let span = self.lookup(route.legs(), last_stop, route.destination())?;
            if state.remaining_kwh - span.kwh < self.vehicle.floor_kwh() {
                return Err(self.below_floor(last_stop, route.destination()));
            }
        }

        Ok(())
    }

    fn verify_step(
        &self,
        step: &PlanStep,
        legs: &[Leg],
        state: &mut SimulationState,
    ) -> Result<(), Violation> {
        let floor = self.vehicle.floor_kwh();
        let tol = self.tolerances;

        let percent = 0.0..=100.0;
        let (before, after) = (step.soc_before_recharge, step.soc_after_recharge);
        if !percent.contains(&before) || !percent.contains(&after) || after < before {
            return Err(Violation::InvalidSoc {
                stop: step.arrival_stop.clone(),
                before,
                after,
            });
        }

        let span = self.lookup(legs, &step.from_stop, &step.arrival_stop)?;
        let remaining_at_from = state.remaining_kwh;
        state.remaining_kwh -= span.kwh;
        state.elapsed += span.minutes;

        if state.remaining_kwh < floor {
            return Err(self.below_floor(&step.from_stop, &step.arrival_stop));
        }

        if let Some(backup) = &step.backup_stop {
            self.verify_backup(step, backup, span, remaining_at_from, legs)?;
        }

        let arrival = parse_time(step, "arrival time", &step.arrival_time)?;
        let deviation = arrival.offset_from(state.elapsed).abs();
        if deviation > tol.arrival_min {
            return Err(Violation::ArrivalTime {
                from: step.from_stop.clone(),
                to: step.arrival_stop.clone(),
                deviation,
            });
        }

        let stated_kwh = self.vehicle.soc_to_kwh(step.soc_before_recharge);
        let deviation = round_to((stated_kwh - state.remaining_kwh).abs(), 2);
        if deviation > tol.soc_kwh {
            return Err(Violation::ArrivalSoc {
                stop: step.arrival_stop.clone(),
                deviation,
            });
        }

        let expected = self
            .vehicle
            .recharge_minutes(step.soc_before_recharge, step.soc_after_recharge);
        let deviation = (step.recharge_time as i64 - expected).abs();
        if deviation > tol.recharge_min {
            return Err(Violation::RechargeTime {
                stop: step.arrival_stop.clone(),
                deviation,
            });
        }

        state.elapsed += step.recharge_time as i64;
        let departure = parse_time(step, "departure time", &step.departure_time)?;
        let offset = departure.offset_from(state.elapsed);
        if offset.abs() > tol.departure_min {
            return Err(Violation::DepartureTime {
                stop: step.arrival_stop.clone(),
                deviation: offset.abs(),
            });
        }

        // Continue from the plan's own figures.
        state.elapsed += offset;
        state.remaining_kwh = round_to(self.vehicle.soc_to_kwh(step.soc_after_recharge), 2);
        Ok(())
    }

    /// The backup must come after the arrival stop and be reachable from
    /// the step's origin without recharging.
    fn verify_backup(
        &self,
        step: &PlanStep,
        backup: &str,
        arrival: Span,
        remaining_at_from: f64,
        legs: &[Leg],
    ) -> Result<(), Violation> {
        let before_arrival = || Violation::BackupBeforeArrival {
            backup: backup.to_string(),
            arrival: step.arrival_stop.clone(),
        };

        let span = match find_span(legs, &step.from_stop, backup) {
            Some(span) if span.last > arrival.last => span,
            Some(_) => return Err(before_arrival()),
            None if legs.iter().any(|l| names_match(backup, l.end())) => {
                return Err(before_arrival());
            }
            None => {
                return Err(Violation::UnknownSpan {
                    from: step.from_stop.clone(),
                    to: backup.to_string(),
                });
            }
        };

        if remaining_at_from - span.kwh < self.vehicle.floor_kwh() {
            return Err(Violation::BackupBelowFloor {
                from: step.from_stop.clone(),
                backup: backup.to_string(),
                hard_min: self.vehicle.hard_min_soc_percent,
            });
        }
        Ok(())
    }

    fn lookup(&self, legs: &[Leg], from: &str, to: &str) -> Result<Span, Violation> {
        find_span(legs, from, to).ok_or_else(|| Violation::UnknownSpan {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    fn below_floor(&self, from: &str, to: &str) -> Violation {
        Violation::BelowFloor {
            from: from.to_string(),
            to: to.to_string(),
            hard_min: self.vehicle.hard_min_soc_percent,
        }
    }
}

fn parse_time(step: &PlanStep, field: &'static str, value: &str) -> Result<ClockTime, Violation> {
    ClockTime::parse_hhmm(value).map_err(|_| Violation::InvalidTime {
        stop: step.arrival_stop.clone(),
        field,
        value: value.to_string(),
    })
}
