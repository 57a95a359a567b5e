use serde::{Deserialize, Serialize};

/// A consulting room. The name is the room's identity: there is no
/// surrogate key, and a room without a name cannot be stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub room_name: Option<String>,
}

impl Room {
    pub fn new(room_name: impl Into<String>) -> Self {
        Self {
            room_name: Some(room_name.into()),
        }
    }

    /// The natural key, if present and non-empty.
    pub fn key(&self) -> Option<&str> {
        self.room_name.as_deref().filter(|name| !name.trim().is_empty())
    }
}
