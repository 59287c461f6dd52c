use serde::{Deserialize, Serialize};

pub const MAX_REMINDERS: usize = 5;

/// Serializes as a reminder override: `{"method": "popup", "minutes": 30}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Reminder {
    Popup { minutes: u32 },
    Email { minutes: u32 },
}

impl Reminder {
    pub fn popup(minutes: u32) -> Self {
        Reminder::Popup { minutes }
    }

    pub fn email(minutes: u32) -> Self {
        Reminder::Email { minutes }
    }

    pub fn minutes_before_start(&self) -> u32 {
        match self {
            Reminder::Popup { minutes } | Reminder::Email { minutes } => *minutes,
        }
    }
}
