//! Actor - the authenticated caller of a chat operation

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Opaque caller identity resolved by the host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Snowflake,
    pub is_staff: bool,
}

impl Actor {
    pub const fn client(id: Snowflake) -> Self {
        Self {
            id,
            is_staff: false,
        }
    }

    pub const fn staff(id: Snowflake) -> Self {
        Self { id, is_staff: true }
    }
}
