use crate::RemindersResponse;
use serde::Deserialize;

pub mod cancel_all_reminders {
    use super::*;

    #[derive(Debug, Deserialize)]
    pub struct PathParams {
        pub receiver_id: i64,
    }

    /// The reminders that were canceled
    pub type APIResponse = RemindersResponse;
}
