//! Per-contractor resource usage over time.
//!
//! Used by the decoder to find the earliest moment a crew (or a whole
//! inseparable chain of crews) fits under a contractor's borders.

use crate::models::Time;

/// Crew held by one work over `[start, finish)`.
#[derive(Debug, Clone)]
struct Reservation {
    start: Time,
    finish: Time,
    demand: Vec<u32>,
}

/// One piece of a unit to place: it starts `offset` after the unit start,
/// lasts `duration` and holds `demand` workers per kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment<'a> {
    pub offset: Time,
    pub duration: Time,
    pub demand: &'a [u32],
}

/// Reservations of every contractor against its capacity row.
#[derive(Debug, Clone)]
pub(crate) struct Timeline {
    capacities: Vec<Vec<u32>>,
    reservations: Vec<Vec<Reservation>>,
}

impl Timeline {
    /// `capacities[contractor][kind]`.
    pub fn new(capacities: Vec<Vec<u32>>) -> Self {
        let reservations = vec![Vec::new(); capacities.len()];
        Self {
            capacities,
            reservations,
        }
    }

    /// Earliest `t >= not_before` such that every segment fits at
    /// `t + offset` on `contractor`.
    ///
    /// Feasibility can only appear when a segment start passes the end of
    /// a reservation, so candidates are `not_before` and every
    /// `finish - offset` beyond it. The latest candidate starts every
    /// segment after all reservations, which fits whenever each demand is
    /// within capacity.
    pub fn earliest_start(
        &self,
        contractor: usize,
        not_before: Time,
        segments: &[Segment<'_>],
    ) -> Time {
        let mut candidates = vec![not_before];
        for r in &self.reservations[contractor] {
            for s in segments {
                let t = r.finish - s.offset;
                if t > not_before {
                    candidates.push(t);
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();

        let latest = candidates.last().copied().unwrap_or(not_before);
        candidates
            .into_iter()
            .find(|&t| {
                segments.iter().all(|s| {
                    let start = t + s.offset;
                    self.fits(contractor, start, start + s.duration, s.demand)
                })
            })
            .unwrap_or(latest)
    }

    /// Whether `demand` fits on `contractor` during `[start, finish)`.
    pub fn fits(&self, contractor: usize, start: Time, finish: Time, demand: &[u32]) -> bool {
        if start >= finish || demand.iter().all(|&d| d == 0) {
            return true;
        }
        let capacity = &self.capacities[contractor];
        let reservations = &self.reservations[contractor];

        // Usage is piecewise constant and only rises where a reservation
        // starts, so checking those points (and `start`) finds the peak.
        let mut points = vec![start];
        points.extend(
            reservations
                .iter()
                .map(|r| r.start)
                .filter(|&p| p > start && p < finish),
        );

        points.into_iter().all(|p| {
            demand.iter().enumerate().all(|(kind, &need)| {
                if need == 0 {
                    return true;
                }
                let used: u64 = reservations
                    .iter()
                    .filter(|r| r.start <= p && p < r.finish)
                    .map(|r| u64::from(r.demand[kind]))
                    .sum();
                used + u64::from(need) <= u64::from(capacity[kind])
            })
        })
    }

    /// Holds `demand` on `contractor` during `[start, finish)`.
    pub fn reserve(&mut self, contractor: usize, start: Time, finish: Time, demand: &[u32]) {
        if start >= finish || demand.iter().all(|&d| d == 0) {
            return;
        }
        self.reservations[contractor].push(Reservation {
            start,
            finish,
            demand: demand.to_vec(),
        });
    }
}
