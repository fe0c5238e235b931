//! Thread entity - the single chat channel bound to one booking

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entities::Actor;
use crate::value_objects::Snowflake;

/// Thread lifecycle: `open -> closing -> closed`, never backwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Open,
    Closing,
    Closed,
}

impl ThreadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }

    /// Whether moving from `self` to `next` is a legal forward step
    pub fn can_transition_to(self, next: ThreadStatus) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Closing) | (Self::Closing, Self::Closed)
        )
    }
}

impl fmt::Display for ThreadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThreadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closing" => Ok(Self::Closing),
            "closed" => Ok(Self::Closed),
            other => Err(format!("unknown thread status: {other}")),
        }
    }
}

/// Thread entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thread {
    pub id: Snowflake,
    pub booking_id: Snowflake,
    pub client_id: Snowflake,
    /// First staff member to interact; informational only
    pub admin_id: Option<Snowflake>,
    pub status: ThreadStatus,
    pub opened_at: DateTime<Utc>,
    /// When `closeThread` moved the thread to `closing`
    pub close_requested_at: Option<DateTime<Utc>>,
    /// Set together with `status = closed`, by the purge job only
    pub closed_at: Option<DateTime<Utc>>,
}

impl Thread {
    /// A fresh open thread for `booking_id`
    ///
    /// `admin_id` is the opener when the opener is staff.
    pub fn open(id: Snowflake, booking_id: Snowflake, client_id: Snowflake, opener: &Actor) -> Self {
        Self {
            id,
            booking_id,
            client_id,
            admin_id: opener.is_staff.then_some(opener.id),
            status: ThreadStatus::Open,
            opened_at: Utc::now(),
            close_requested_at: None,
            closed_at: None,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == ThreadStatus::Open
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.status == ThreadStatus::Closed
    }

    /// Client owner or any staff member
    pub fn is_participant(&self, actor: &Actor) -> bool {
        actor.is_staff || actor.id == self.client_id
    }
}
