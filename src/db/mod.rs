pub mod repository;
pub mod sqlite;

pub use repository::*;
pub use sqlite::*;

use thiserror::Error;

/// Raised when an entity reaches the store without a usable identifier.
/// Rooms are keyed by name, so a room with no name has nothing to key on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("ids for {entity_type} must be assigned before persisting")]
pub struct IdentifierGenerationError {
    pub entity_type: String,
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("{entity_type} has not been persisted yet")]
    Unpersisted { entity_type: String },

    #[error("Could not persist {entity_type}")]
    Persist {
        entity_type: String,
        #[source]
        source: IdentifierGenerationError,
    },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Appointment is missing {0}")]
    Incomplete(String),

    #[error("Room {room} is already booked by appointment {existing}")]
    Conflict { room: String, existing: String },
}

impl DatabaseError {
    /// Failure to persist an entity whose identifier cannot be produced.
    pub fn missing_identifier(entity_type: &str) -> Self {
        Self::Persist {
            entity_type: entity_type.into(),
            source: IdentifierGenerationError {
                entity_type: entity_type.into(),
            },
        }
    }
}
