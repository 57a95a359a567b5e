use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_id;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &mut Patient) -> Result<Uuid, DatabaseError> {
    let id = patient.id.unwrap_or_else(Uuid::new_v4);
    conn.execute(
        "INSERT INTO patients (id, first_name, last_name, age, email)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.age,
            patient.email,
        ],
    )?;
    patient.id = Some(id);
    tracing::debug!(%id, "Inserted patient");
    Ok(id)
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, first_name, last_name, age, email FROM patients WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok(PatientRow {
                id: row.get(0)?,
                first_name: row.get(1)?,
                last_name: row.get(2)?,
                age: row.get(3)?,
                email: row.get(4)?,
            })
        },
    );

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let id = patient.id.ok_or_else(|| DatabaseError::Unpersisted {
        entity_type: "Patient".into(),
    })?;
    let updated = conn.execute(
        "UPDATE patients SET first_name = ?2, last_name = ?3, age = ?4, email = ?5
         WHERE id = ?1",
        params![
            id.to_string(),
            patient.first_name,
            patient.last_name,
            patient.age,
            patient.email,
        ],
    )?;
    if updated == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_patient(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Patient".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn get_all_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, first_name, last_name, age, email FROM patients
         ORDER BY last_name, first_name",
    )?;

    let rows = stmt.query_map([], |row| {
        Ok(PatientRow {
            id: row.get(0)?,
            first_name: row.get(1)?,
            last_name: row.get(2)?,
            age: row.get(3)?,
            email: row.get(4)?,
        })
    })?;

    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    first_name: Option<String>,
    last_name: Option<String>,
    age: i32,
    email: Option<String>,
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: Some(parse_id(&row.id)?),
        first_name: row.first_name,
        last_name: row.last_name,
        age: row.age,
        email: row.email,
    })
}
