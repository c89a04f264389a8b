//! Reservation domain models.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::payment::PaymentMethod;
use crate::place::Point;

/// Maximum number of confirmed reservations kept in history.
pub const HISTORY_CAPACITY: usize = 5;

/// Where the draft currently stands.
///
/// Derived from which of pickup/dropoff are set; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// No pickup chosen yet.
    AwaitingPickup,
    /// Pickup chosen, drop-off still open.
    AwaitingDropoff,
    /// Both points chosen; the reservation can be confirmed.
    ReadyToConfirm,
}

/// The in-progress, unconfirmed pickup/drop-off selection.
///
/// The candidate is a staging slot filled by map taps. It is independent of
/// the phase and is consumed by either the draft or a place registration.
/// Fields are private so a drop-off can never precede a pickup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationDraft {
    pickup: Option<Point>,
    dropoff: Option<Point>,
    candidate: Option<Point>,
}

impl ReservationDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pickup(&self) -> Option<Point> {
        self.pickup
    }

    pub fn dropoff(&self) -> Option<Point> {
        self.dropoff
    }

    pub fn candidate(&self) -> Option<Point> {
        self.candidate
    }

    pub fn phase(&self) -> DraftPhase {
        match (self.pickup, self.dropoff) {
            (None, _) => DraftPhase::AwaitingPickup,
            (Some(_), None) => DraftPhase::AwaitingDropoff,
            (Some(_), Some(_)) => DraftPhase::ReadyToConfirm,
        }
    }

    /// Overwrites the candidate regardless of phase.
    pub fn set_candidate(&mut self, point: Point) {
        self.candidate = Some(point);
    }

    /// Moves the candidate into the pickup slot.
    ///
    /// Returns `false` without changing anything unless the draft is
    /// awaiting a pickup and a candidate exists.
    pub fn choose_candidate_as_pickup(&mut self) -> bool {
        match (self.phase(), self.candidate) {
            (DraftPhase::AwaitingPickup, Some(point)) => {
                self.pickup = Some(point);
                true
            }
            _ => false,
        }
    }

    /// Moves the candidate into the drop-off slot.
    ///
    /// Returns `false` without changing anything unless the draft is
    /// awaiting a drop-off and a candidate exists.
    pub fn choose_candidate_as_dropoff(&mut self) -> bool {
        match (self.phase(), self.candidate) {
            (DraftPhase::AwaitingDropoff, Some(point)) => {
                self.dropoff = Some(point);
                true
            }
            _ => false,
        }
    }

    /// Returns both endpoints when the draft is ready to confirm.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.pickup.zip(self.dropoff)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A confirmed reservation as written to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationRecord {
    /// ISO-8601 UTC timestamp with millisecond precision.
    pub timestamp: String,
    pub pickup: Point,
    pub dropoff: Point,
    pub payment: PaymentMethod,
}

impl ReservationRecord {
    pub fn new(at: DateTime<Utc>, pickup: Point, dropoff: Point, payment: PaymentMethod) -> Self {
        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            pickup,
            dropoff,
            payment,
        }
    }
}
