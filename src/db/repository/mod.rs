//! Repository layer: entity-scoped database operations.
//!
//! Free functions per entity take a `&Connection`. `Store` owns a connection
//! and exposes the same operations through the `Repository` trait.

mod appointment;
mod doctor;
mod patient;
mod room;

use std::path::Path;

use rusqlite::Connection;
use uuid::Uuid;

use super::{open_database, open_memory_database, DatabaseError};
use crate::models::*;

/// Base repository operations for any entity keyed by `K`
pub trait Repository<T, K> {
    /// Persist a new entity and return its key. Surrogate keys are
    /// generated here and written back into `entity`.
    fn insert(&self, entity: &mut T) -> Result<K, DatabaseError>;
    fn get(&self, id: &K) -> Result<Option<T>, DatabaseError>;
    fn update(&self, entity: &T) -> Result<(), DatabaseError>;
    fn delete(&self, id: &K) -> Result<(), DatabaseError>;
    fn list(&self) -> Result<Vec<T>, DatabaseError>;
}

// Re-export all public items from sub-modules
pub use appointment::*;
pub use doctor::*;
pub use patient::*;
pub use room::*;

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

// ═══════════════════════════════════════════
// Store
// ═══════════════════════════════════════════

/// A booking database handle.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: open_database(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self {
            conn: open_memory_database()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn appointment_details(
        &self,
        id: &Uuid,
    ) -> Result<Option<AppointmentDetails>, DatabaseError> {
        get_appointment_details(&self.conn, id)
    }
}

impl Repository<Doctor, Uuid> for Store {
    fn insert(&self, entity: &mut Doctor) -> Result<Uuid, DatabaseError> {
        insert_doctor(&self.conn, entity)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Doctor>, DatabaseError> {
        get_doctor(&self.conn, id)
    }

    fn update(&self, entity: &Doctor) -> Result<(), DatabaseError> {
        update_doctor(&self.conn, entity)
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_doctor(&self.conn, id)
    }

    fn list(&self) -> Result<Vec<Doctor>, DatabaseError> {
        get_all_doctors(&self.conn)
    }
}

impl Repository<Patient, Uuid> for Store {
    fn insert(&self, entity: &mut Patient) -> Result<Uuid, DatabaseError> {
        insert_patient(&self.conn, entity)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
        get_patient(&self.conn, id)
    }

    fn update(&self, entity: &Patient) -> Result<(), DatabaseError> {
        update_patient(&self.conn, entity)
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_patient(&self.conn, id)
    }

    fn list(&self) -> Result<Vec<Patient>, DatabaseError> {
        get_all_patients(&self.conn)
    }
}

impl Repository<Room, String> for Store {
    fn insert(&self, entity: &mut Room) -> Result<String, DatabaseError> {
        insert_room(&self.conn, entity)
    }

    fn get(&self, id: &String) -> Result<Option<Room>, DatabaseError> {
        get_room(&self.conn, id)
    }

    /// Rooms carry nothing besides their key, so this only checks the room
    /// exists.
    fn update(&self, entity: &Room) -> Result<(), DatabaseError> {
        let name = entity
            .key()
            .ok_or_else(|| DatabaseError::missing_identifier("Room"))?;
        match get_room(&self.conn, name)? {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound {
                entity_type: "Room".into(),
                id: name.into(),
            }),
        }
    }

    fn delete(&self, id: &String) -> Result<(), DatabaseError> {
        delete_room(&self.conn, id)
    }

    fn list(&self) -> Result<Vec<Room>, DatabaseError> {
        get_all_rooms(&self.conn)
    }
}

impl Repository<Appointment, Uuid> for Store {
    fn insert(&self, entity: &mut Appointment) -> Result<Uuid, DatabaseError> {
        insert_appointment(&self.conn, entity)
    }

    fn get(&self, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
        get_appointment(&self.conn, id)
    }

    fn update(&self, entity: &Appointment) -> Result<(), DatabaseError> {
        update_appointment(&self.conn, entity)
    }

    fn delete(&self, id: &Uuid) -> Result<(), DatabaseError> {
        delete_appointment(&self.conn, id)
    }

    fn list(&self) -> Result<Vec<Appointment>, DatabaseError> {
        get_all_appointments(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::db::IdentifierGenerationError;
    use chrono::NaiveDateTime;

    fn test_store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn jose_luis() -> Patient {
        Patient::new("Jose Luis", "Olaya", 37, "j.olaya@email.com")
    }

    fn perla() -> Doctor {
        Doctor::new("Perla", "Amalia", 24, "p.amalia@hospital.accwe")
    }

    /// Persist patient, doctor and room, then schedule them together.
    fn scheduled(
        store: &Store,
        starts: &str,
        finishes: &str,
    ) -> (Patient, Doctor, Room, Appointment) {
        let mut patient = jose_luis();
        let mut doctor = perla();
        let mut room = Room::new("Dermatology");
        store.insert(&mut patient).unwrap();
        store.insert(&mut doctor).unwrap();
        store.insert(&mut room).unwrap();
        let appt = Appointment::new(&patient, &doctor, &room, at(starts), at(finishes));
        (patient, doctor, room, appt)
    }

    // ── Appointment ──────────────────────────────────────

    #[test]
    fn appointment_persists_with_all_data() {
        let store = test_store();
        let (_, _, _, mut appt) = scheduled(&store, "19:30 24/04/2023", "20:30 24/04/2023");

        let id = store.insert(&mut appt).unwrap();
        assert_eq!(appt.id, Some(id));

        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.patient_id, appt.patient_id);
        assert_eq!(stored.doctor_id, appt.doctor_id);
        assert_eq!(stored.room_name, appt.room_name);
        assert_eq!(stored.starts_at, appt.starts_at);
        assert_eq!(stored.finishes_at, appt.finishes_at);
        assert_eq!(stored, appt);
    }

    #[test]
    fn blank_appointment_persists_with_null_fields() {
        let store = test_store();
        let mut appt = Appointment::default();

        let id = store.insert(&mut appt).unwrap();

        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert!(stored.patient_id.is_none());
        assert!(stored.doctor_id.is_none());
        assert!(stored.room_name.is_none());
        assert!(stored.starts_at.is_none());
        assert!(stored.finishes_at.is_none());
    }

    #[test]
    fn appointment_changes_survive_round_trip() {
        let store = test_store();
        let (_, _, _, mut appt) = scheduled(&store, "19:30 24/04/2023", "20:30 24/04/2023");

        let mut miren = Doctor::new("Miren", "Iniesta", 24, "m.iniesta@hospital.accwe");
        store.insert(&mut miren).unwrap();
        appt.set_doctor(&miren);
        let id = store.insert(&mut appt).unwrap();

        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.doctor_id, miren.id);
        assert_eq!(stored.patient_id, appt.patient_id);
        assert_eq!(stored.room_name, appt.room_name);
        assert_eq!(stored.starts_at, appt.starts_at);
        assert_eq!(stored.finishes_at, appt.finishes_at);

        appt.finishes_at = Some(at("21:00 24/04/2023"));
        store.update(&appt).unwrap();
        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.finishes_at, Some(at("21:00 24/04/2023")));
    }

    #[test]
    fn appointment_details_resolve_references() {
        let store = test_store();
        let (patient, doctor, room, mut appt) =
            scheduled(&store, "19:30 24/04/2023", "20:30 24/04/2023");
        let id = store.insert(&mut appt).unwrap();

        let details = store.appointment_details(&id).unwrap().unwrap();
        assert_eq!(details.id, id);
        assert_eq!(details.patient, Some(patient));
        assert_eq!(details.doctor, Some(doctor));
        assert_eq!(details.room, Some(room));
        assert_eq!(details.starts_at, Some(at("19:30 24/04/2023")));
    }

    #[test]
    fn appointment_details_of_stub_have_no_references() {
        let store = test_store();
        let mut appt = Appointment::default();
        let id = store.insert(&mut appt).unwrap();

        let details = store.appointment_details(&id).unwrap().unwrap();
        assert!(details.patient.is_none());
        assert!(details.doctor.is_none());
        assert!(details.room.is_none());
    }

    #[test]
    fn appointment_with_unsaved_room_is_rejected() {
        let store = test_store();
        let mut appt = Appointment {
            room_name: Some("Nowhere".into()),
            ..Default::default()
        };
        let err = store.insert(&mut appt).unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
        assert!(appt.id.is_none(), "failed insert must not assign an id");
    }

    #[test]
    fn deleting_doctor_unlinks_appointment() {
        let store = test_store();
        let (_, doctor, _, mut appt) = scheduled(&store, "19:30 24/04/2023", "20:30 24/04/2023");
        let id = store.insert(&mut appt).unwrap();

        Repository::<Doctor, Uuid>::delete(&store, &doctor.id.unwrap()).unwrap();

        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert!(stored.doctor_id.is_none());
        assert!(stored.patient_id.is_some());
    }

    #[test]
    fn appointments_listed_by_room_in_time_order() {
        let store = test_store();
        let (patient, doctor, room, mut late) =
            scheduled(&store, "20:45 24/04/2023", "21:00 24/04/2023");
        let mut early = Appointment::new(
            &patient,
            &doctor,
            &room,
            at("19:30 24/04/2023"),
            at("19:45 24/04/2023"),
        );
        let mut gyn = Room::new("Gynecology");
        store.insert(&mut gyn).unwrap();
        let mut elsewhere = Appointment::new(
            &patient,
            &doctor,
            &gyn,
            at("19:00 24/04/2023"),
            at("19:15 24/04/2023"),
        );
        store.insert(&mut late).unwrap();
        store.insert(&mut early).unwrap();
        store.insert(&mut elsewhere).unwrap();

        let in_room = get_appointments_in_room(store.connection(), "Dermatology").unwrap();
        assert_eq!(in_room.len(), 2);
        assert_eq!(in_room[0].id, early.id);
        assert_eq!(in_room[1].id, late.id);

        let all: Vec<Appointment> = store.list().unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, elsewhere.id);
    }

    #[test]
    fn delete_missing_appointment_is_not_found() {
        let store = test_store();
        let err = Repository::<Appointment, Uuid>::delete(&store, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn update_unsaved_appointment_is_rejected() {
        let store = test_store();
        let err = store.update(&Appointment::default()).unwrap_err();
        assert!(matches!(err, DatabaseError::Unpersisted { .. }));
    }

    // ── Doctor ───────────────────────────────────────────

    #[test]
    fn doctor_persists_with_all_data() {
        let store = test_store();
        let mut doctor = perla();
        let id = store.insert(&mut doctor).unwrap();

        let stored: Doctor = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.first_name.as_deref(), Some("Perla"));
        assert_eq!(stored.last_name.as_deref(), Some("Amalia"));
        assert_eq!(stored.age, 24);
        assert_eq!(stored.email.as_deref(), Some("p.amalia@hospital.accwe"));
    }

    #[test]
    fn blank_doctor_persists_with_null_fields() {
        let store = test_store();
        let mut doctor = Doctor::default();
        let id = store.insert(&mut doctor).unwrap();

        let stored: Doctor = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert!(stored.first_name.is_none());
        assert!(stored.last_name.is_none());
        assert_eq!(stored.age, 0);
        assert!(stored.email.is_none());
    }

    #[test]
    fn doctor_changes_survive_round_trip() {
        let store = test_store();
        let mut doctor = perla();
        doctor.age = 25;
        let id = store.insert(&mut doctor).unwrap();

        let stored: Doctor = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.age, 25);
        assert_eq!(stored.first_name.as_deref(), Some("Perla"));

        doctor.email = Some("perla.amalia@hospital.accwe".into());
        store.update(&doctor).unwrap();
        let stored: Doctor = store.get(&id).unwrap().unwrap();
        assert_eq!(stored, doctor);
    }

    #[test]
    fn missing_doctor_is_none() {
        let store = test_store();
        let found: Option<Doctor> = store.get(&Uuid::new_v4()).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn every_doctor_gets_a_distinct_id() {
        let store = test_store();
        let mut a = perla();
        let mut b = perla();
        let id_a = store.insert(&mut a).unwrap();
        let id_b = store.insert(&mut b).unwrap();
        assert_ne!(id_a, id_b);
        let all: Vec<Doctor> = store.list().unwrap();
        assert_eq!(all.len(), 2);
    }

    // ── Patient ──────────────────────────────────────────

    #[test]
    fn patient_persists_with_all_data() {
        let store = test_store();
        let mut patient = jose_luis();
        let id = store.insert(&mut patient).unwrap();

        let stored: Patient = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.first_name, patient.first_name);
        assert_eq!(stored.last_name, patient.last_name);
        assert_eq!(stored.age, patient.age);
        assert_eq!(stored.email, patient.email);
    }

    #[test]
    fn blank_patient_persists_with_null_fields() {
        let store = test_store();
        let mut patient = Patient::default();
        let id = store.insert(&mut patient).unwrap();

        let stored: Patient = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.id, Some(id));
        assert!(stored.first_name.is_none());
        assert!(stored.last_name.is_none());
        assert_eq!(stored.age, 0);
        assert!(stored.email.is_none());
    }

    #[test]
    fn patient_changes_survive_round_trip() {
        let store = test_store();
        let mut patient = jose_luis();
        patient.age = 38;
        let id = store.insert(&mut patient).unwrap();

        let stored: Patient = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.age, 38);
        assert_eq!(stored, patient);

        Repository::<Patient, Uuid>::delete(&store, &id).unwrap();
        let gone: Option<Patient> = store.get(&id).unwrap();
        assert!(gone.is_none());
    }

    #[test]
    fn patients_listed_by_surname() {
        let store = test_store();
        let mut olaya = jose_luis();
        let mut antunez = Patient::new("Paulino", "Antunez", 37, "p.antunez@email.com");
        store.insert(&mut olaya).unwrap();
        store.insert(&mut antunez).unwrap();

        let all: Vec<Patient> = store.list().unwrap();
        let surnames: Vec<_> = all.iter().filter_map(|p| p.last_name.as_deref()).collect();
        assert_eq!(surnames, ["Antunez", "Olaya"]);
    }

    // ── Room ─────────────────────────────────────────────

    #[test]
    fn room_persists_under_its_name() {
        let store = test_store();
        let mut room = Room::new("Gynecology");
        let key = store.insert(&mut room).unwrap();
        assert_eq!(key, "Gynecology");

        let stored: Room = store.get(&key).unwrap().unwrap();
        assert_eq!(stored.room_name, room.room_name);
    }

    #[test]
    fn blank_room_fails_with_identifier_generation_cause() {
        let store = test_store();
        let mut room = Room::default();

        let err = store.insert(&mut room).unwrap_err();
        assert!(matches!(err, DatabaseError::Persist { .. }));
        let cause = err.source().expect("persist error carries a cause");
        assert!(cause.downcast_ref::<IdentifierGenerationError>().is_some());
    }

    #[test]
    fn empty_room_name_is_treated_as_absent() {
        let store = test_store();
        let mut room = Room::new("   ");
        let err = store.insert(&mut room).unwrap_err();
        assert!(matches!(err, DatabaseError::Persist { .. }));
        let rooms: Vec<Room> = store.list().unwrap();
        assert!(rooms.is_empty());
    }

    #[test]
    fn duplicate_room_name_is_rejected() {
        let store = test_store();
        store.insert(&mut Room::new("Dermatology")).unwrap();
        let err = store.insert(&mut Room::new("Dermatology")).unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlite(_)));
    }

    #[test]
    fn room_update_requires_existing_room() {
        let store = test_store();
        let mut room = Room::new("Cardiology");
        assert!(matches!(
            store.update(&room).unwrap_err(),
            DatabaseError::NotFound { .. }
        ));
        store.insert(&mut room).unwrap();
        store.update(&room).unwrap();
    }

    #[test]
    fn deleting_room_unschedules_its_appointments() {
        let store = test_store();
        let (_, _, room, mut appt) = scheduled(&store, "19:30 24/04/2023", "20:30 24/04/2023");
        let id = store.insert(&mut appt).unwrap();

        Repository::<Room, String>::delete(&store, &room.room_name.clone().unwrap()).unwrap();

        let stored: Appointment = store.get(&id).unwrap().unwrap();
        assert!(stored.room_name.is_none());
        assert_eq!(stored.starts_at, appt.starts_at);
    }
}
