use crate::dtos::ReminderDTO;
use nudge_domain::{Reminder, ReminderType, UserChoice};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderResponse {
    pub reminder: ReminderDTO,
}

impl ReminderResponse {
    pub fn new(reminder: Reminder) -> Self {
        Self {
            reminder: ReminderDTO::new(reminder),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemindersResponse {
    pub reminders: Vec<ReminderDTO>,
}

impl RemindersResponse {
    pub fn new(reminders: Vec<Reminder>) -> Self {
        Self {
            reminders: reminders.into_iter().map(ReminderDTO::new).collect(),
        }
    }
}

pub mod enable_reminders {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub receiver_id: i64,
    }

    pub type APIResponse = RemindersResponse;
}

pub mod get_receiver_reminders {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub receiver_id: i64,
    }

    pub type APIResponse = RemindersResponse;
}

pub mod respond_to_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub receiver_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// The type of the reminder that was answered
        #[serde(default)]
        pub reminder_type: Option<ReminderType>,
        pub choice: UserChoice,
    }

    /// The reminders that were armed as a consequence of the response
    pub type APIResponse = RemindersResponse;
}

pub mod rearm_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub receiver_id: i64,
        pub reminder_type: String,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod get_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: String,
    }

    pub type APIResponse = ReminderResponse;
}

pub mod reschedule_reminder {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub reminder_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// Epoch seconds
        pub remind_at: f64,
    }

    pub type APIResponse = ReminderResponse;
}
