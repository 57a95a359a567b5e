//! Appointment entity and the room overlap check.
//!
//! Two appointments clash when they are booked into the same room and their
//! time ranges share at least one instant. Both ends of a range are
//! inclusive, so an appointment ending at 20:00 clashes with one starting at
//! 20:00, and a zero-length appointment still occupies its instant.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Doctor, Patient, Room};
use crate::config::TIMESTAMP_FORMAT;

// ─── Types ────────────────────────────────────────────────────────────────────

/// An appointment between a patient and a doctor in a room.
///
/// Every reference and both timestamps are optional: `Appointment::default()`
/// is an unscheduled stub. References are held by key and resolved by the
/// store (see `db::get_appointment_details`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub room_name: Option<String>,
    pub starts_at: Option<NaiveDateTime>,
    pub finishes_at: Option<NaiveDateTime>,
}

/// An appointment with its references loaded from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentDetails {
    pub id: Uuid,
    pub patient: Option<Patient>,
    pub doctor: Option<Doctor>,
    pub room: Option<Room>,
    pub starts_at: Option<NaiveDateTime>,
    pub finishes_at: Option<NaiveDateTime>,
}

/// Closed interval `[start, end]`. Always stored with `start <= end`,
/// including when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTimeRange")]
pub struct TimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

// Wire shape of `TimeRange`; endpoints may arrive in either order.
#[derive(Deserialize)]
struct RawTimeRange {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl From<RawTimeRange> for TimeRange {
    fn from(raw: RawTimeRange) -> Self {
        Self::new(raw.start, raw.end)
    }
}

// ─── TimeRange ────────────────────────────────────────────────────────────────

impl TimeRange {
    /// Build a range from two endpoints. Endpoints given in reverse order
    /// are swapped.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end < start {
            Self { start: end, end: start }
        } else {
            Self { start, end }
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// True when the two ranges share at least one instant.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

// ─── Appointment ──────────────────────────────────────────────────────────────

impl Appointment {
    /// Schedule an appointment. Keys are copied from the referenced
    /// entities, so patient and doctor should be persisted first if the
    /// appointment is going to be stored.
    pub fn new(
        patient: &Patient,
        doctor: &Doctor,
        room: &Room,
        starts_at: NaiveDateTime,
        finishes_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            patient_id: patient.id,
            doctor_id: doctor.id,
            room_name: room.key().map(str::to_owned),
            starts_at: Some(starts_at),
            finishes_at: Some(finishes_at),
        }
    }

    pub fn set_patient(&mut self, patient: &Patient) {
        self.patient_id = patient.id;
    }

    pub fn set_doctor(&mut self, doctor: &Doctor) {
        self.doctor_id = doctor.id;
    }

    /// Book into `room`. A room without a usable name leaves the
    /// appointment unroomed.
    pub fn set_room(&mut self, room: &Room) {
        self.room_name = room.key().map(str::to_owned);
    }

    /// The occupied time range, or `None` for a stub missing either end.
    pub fn time_range(&self) -> Option<TimeRange> {
        match (self.starts_at, self.finishes_at) {
            (Some(start), Some(end)) => Some(TimeRange::new(start, end)),
            _ => None,
        }
    }

    /// True when the time ranges of both appointments intersect.
    ///
    /// Only meaningful for two appointments in the same room; rooms are not
    /// compared here (see [`Appointment::conflicts_with`]). An appointment
    /// without a complete time range overlaps nothing.
    pub fn overlaps(&self, other: &Appointment) -> bool {
        match (self.time_range(), other.time_range()) {
            (Some(a), Some(b)) => a.overlaps(&b),
            _ => false,
        }
    }

    /// Room-aware clash: same room and overlapping times.
    pub fn conflicts_with(&self, other: &Appointment) -> bool {
        match (self.room_name.as_deref(), other.room_name.as_deref()) {
            (Some(a), Some(b)) if a == b => self.overlaps(other),
            _ => false,
        }
    }
}

/// Parse a timestamp written as `HH:MM DD/MM/YYYY`.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
