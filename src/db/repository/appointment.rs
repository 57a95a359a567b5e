use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Params};
use uuid::Uuid;

use super::{get_doctor, get_patient, get_room, parse_id};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert an appointment, assigning a fresh id when it has none.
///
/// Patient, doctor and room must already be stored; a dangling reference is
/// rejected by the foreign keys as a `DatabaseError::Sqlite`.
pub fn insert_appointment(
    conn: &Connection,
    appointment: &mut Appointment,
) -> Result<Uuid, DatabaseError> {
    let id = appointment.id.unwrap_or_else(Uuid::new_v4);
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, room_name, starts_at, finishes_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id.to_string(),
            appointment.patient_id.map(|id| id.to_string()),
            appointment.doctor_id.map(|id| id.to_string()),
            appointment.room_name,
            appointment.starts_at,
            appointment.finishes_at,
        ],
    )?;
    appointment.id = Some(id);
    tracing::debug!(%id, room = ?appointment.room_name, "Inserted appointment");
    Ok(id)
}

pub fn get_appointment(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Appointment>, DatabaseError> {
    let mut found = query_appointments(
        conn,
        "SELECT id, patient_id, doctor_id, room_name, starts_at, finishes_at
         FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(found.pop())
}

pub fn update_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    let id = appointment.id.ok_or_else(|| DatabaseError::Unpersisted {
        entity_type: "Appointment".into(),
    })?;
    let updated = conn.execute(
        "UPDATE appointments SET patient_id = ?2, doctor_id = ?3, room_name = ?4,
         starts_at = ?5, finishes_at = ?6
         WHERE id = ?1",
        params![
            id.to_string(),
            appointment.patient_id.map(|id| id.to_string()),
            appointment.doctor_id.map(|id| id.to_string()),
            appointment.room_name,
            appointment.starts_at,
            appointment.finishes_at,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// All appointments, earliest first. Unscheduled stubs sort first.
pub fn get_all_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        "SELECT id, patient_id, doctor_id, room_name, starts_at, finishes_at
         FROM appointments ORDER BY starts_at",
        [],
    )
}

pub fn get_appointments_in_room(
    conn: &Connection,
    room_name: &str,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(
        conn,
        "SELECT id, patient_id, doctor_id, room_name, starts_at, finishes_at
         FROM appointments WHERE room_name = ?1 ORDER BY starts_at",
        params![room_name],
    )
}

/// Load an appointment together with the patient, doctor and room it
/// references.
pub fn get_appointment_details(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<AppointmentDetails>, DatabaseError> {
    let Some(appointment) = get_appointment(conn, id)? else {
        return Ok(None);
    };

    let patient = match appointment.patient_id {
        Some(pid) => get_patient(conn, &pid)?,
        None => None,
    };
    let doctor = match appointment.doctor_id {
        Some(did) => get_doctor(conn, &did)?,
        None => None,
    };
    let room = match appointment.room_name.as_deref() {
        Some(name) => get_room(conn, name)?,
        None => None,
    };

    Ok(Some(AppointmentDetails {
        id: *id,
        patient,
        doctor,
        room,
        starts_at: appointment.starts_at,
        finishes_at: appointment.finishes_at,
    }))
}

fn query_appointments<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        Ok(AppointmentRow {
            id: row.get(0)?,
            patient_id: row.get(1)?,
            doctor_id: row.get(2)?,
            room_name: row.get(3)?,
            starts_at: row.get(4)?,
            finishes_at: row.get(5)?,
        })
    })?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    patient_id: Option<String>,
    doctor_id: Option<String>,
    room_name: Option<String>,
    starts_at: Option<NaiveDateTime>,
    finishes_at: Option<NaiveDateTime>,
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: Some(parse_id(&row.id)?),
        patient_id: row.patient_id.as_deref().map(parse_id).transpose()?,
        doctor_id: row.doctor_id.as_deref().map(parse_id).transpose()?,
        room_name: row.room_name,
        starts_at: row.starts_at,
        finishes_at: row.finishes_at,
    })
}
