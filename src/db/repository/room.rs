use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::*;

/// Insert a room under its name. Fails with an identifier-generation cause
/// when the room has no name, since the name is its only key.
pub fn insert_room(conn: &Connection, room: &Room) -> Result<String, DatabaseError> {
    let Some(name) = room.key() else {
        return Err(DatabaseError::missing_identifier("Room"));
    };
    conn.execute("INSERT INTO rooms (room_name) VALUES (?1)", params![name])?;
    tracing::debug!(room = name, "Inserted room");
    Ok(name.to_string())
}

pub fn get_room(conn: &Connection, room_name: &str) -> Result<Option<Room>, DatabaseError> {
    let result = conn.query_row(
        "SELECT room_name FROM rooms WHERE room_name = ?1",
        params![room_name],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(name) => Ok(Some(Room::new(name))),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Delete a room. Appointments booked into it are left without a room.
pub fn delete_room(conn: &Connection, room_name: &str) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM rooms WHERE room_name = ?1", params![room_name])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Room".into(),
            id: room_name.into(),
        });
    }
    Ok(())
}

pub fn get_all_rooms(conn: &Connection) -> Result<Vec<Room>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT room_name FROM rooms ORDER BY room_name")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    rows.map(|r| r.map(Room::new).map_err(DatabaseError::from))
        .collect()
}
