use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_id;
use crate::db::DatabaseError;
use crate::models::*;

/// Insert a doctor, assigning a fresh id when it has none.
/// The id is written back to `doctor` once the row exists.
pub fn insert_doctor(conn: &Connection, doctor: &mut Doctor) -> Result<Uuid, DatabaseError> {
    let id = doctor.id.unwrap_or_else(Uuid::new_v4);
    conn.execute(
        "INSERT INTO doctors (id, first_name, last_name, age, email)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            doctor.first_name,
            doctor.last_name,
            doctor.age,
            doctor.email,
        ],
    )?;
    doctor.id = Some(id);
    tracing::debug!(%id, "Inserted doctor");
    Ok(id)
}

pub fn get_doctor(conn: &Connection, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, first_name, last_name, age, email FROM doctors WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(DoctorRow {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                age: row.get(3)?,
                email: row.get(4)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(doctor_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_doctor(conn: &Connection, doctor: &Doctor) -> Result<(), DatabaseError> {
    let id = doctor.id.ok_or_else(|| DatabaseError::Unpersisted {
        entity_type: "Doctor".into(),
    })?;
    let updated = conn.execute(
        "UPDATE doctors SET first_name = ?2, last_name = ?3, age = ?4, email = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            doctor.first_name,
            doctor.last_name,
            doctor.age,
            doctor.email,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Delete a doctor. Appointments that referenced them keep their slot but
/// lose the doctor reference.
pub fn delete_doctor(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM doctors WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Doctor".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_all_doctors(conn: &Connection) -> Result<Vec<Doctor>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, age, email FROM doctors
         ORDER BY last_name, first_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(DoctorRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            age: row.get(3)?,
            email: row.get(4)?,
        })
    })?;

    let mut doctors = Vec::new();
    for row in rows {
        doctors.push(doctor_from_row(row?)?);
    }
    Ok(doctors)
}

// Internal row type for Doctor mapping
struct DoctorRow {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    age: i32,
    email: Option<String>,
}

fn doctor_from_row(row: DoctorRow) -> Result<Doctor, DatabaseError> {
    Ok(Doctor {
        id: Some(parse_id(&row.id)?),
        first_name: row.first_name,
        last_name: row.last_name,
        age: row.age,
        email: row.email,
    })
}
