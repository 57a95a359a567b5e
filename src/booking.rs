//! Room booking: refuses appointments that would share a room with an
//! overlapping appointment.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::{get_appointments_in_room, insert_appointment, update_appointment, DatabaseError};
use crate::models::Appointment;

/// Stored appointments in the same room whose time range overlaps
/// `appointment`. The appointment itself is skipped when it is already
/// stored.
pub fn find_room_conflicts(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<Vec<Appointment>, DatabaseError> {
    let Some(room) = appointment.room_name.as_deref() else {
        return Ok(Vec::new());
    };

    let conflicts = get_appointments_in_room(conn, room)?
        .into_iter()
        .filter(|other| appointment.id.is_none() || other.id != appointment.id)
        .filter(|other| appointment.conflicts_with(other))
        .collect();
    Ok(conflicts)
}

/// Store a new appointment unless its room is already taken for any part
/// of its time range.
pub fn book_appointment(
    conn: &Connection,
    appointment: &mut Appointment,
) -> Result<Uuid, DatabaseError> {
    let room = ensure_schedulable(appointment)?;
    reject_conflicts(conn, appointment, &room)?;
    let id = insert_appointment(conn, appointment)?;
    tracing::info!(%id, room = %room, "Booked appointment");
    Ok(id)
}

/// Move a stored appointment to a new time range, with the same conflict
/// rules as booking.
pub fn reschedule_appointment(
    conn: &Connection,
    appointment: &mut Appointment,
    starts_at: NaiveDateTime,
    finishes_at: NaiveDateTime,
) -> Result<(), DatabaseError> {
    if appointment.id.is_none() {
        return Err(DatabaseError::Unpersisted {
            entity_type: "Appointment".into(),
        });
    }

    let mut moved = appointment.clone();
    moved.starts_at = Some(starts_at);
    moved.finishes_at = Some(finishes_at);

    let room = ensure_schedulable(&moved)?;
    reject_conflicts(conn, &moved, &room)?;
    update_appointment(conn, &moved)?;
    *appointment = moved;
    Ok(())
}

fn ensure_schedulable(appointment: &Appointment) -> Result<String, DatabaseError> {
    let room = appointment
        .room_name
        .clone()
        .ok_or_else(|| DatabaseError::Incomplete("a room".into()))?;
    if appointment.time_range().is_none() {
        return Err(DatabaseError::Incomplete("start and finish times".into()));
    }
    Ok(room)
}

fn reject_conflicts(
    conn: &Connection,
    appointment: &Appointment,
    room: &str,
) -> Result<(), DatabaseError> {
    if let Some(existing) = find_room_conflicts(conn, appointment)?.first() {
        let existing = existing.id.map(|id| id.to_string()).unwrap_or_default();
        tracing::warn!(room, %existing, "Refused overlapping booking");
        return Err(DatabaseError::Conflict {
            room: room.into(),
            existing,
        });
    }
    Ok(())
}
