mod base;
mod receiver;
mod reminder;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use receiver::ReceiverClient;
pub use receiver::RespondInput;
use reminder::ReminderClient;
use status::StatusClient;
use std::sync::Arc;

pub use nudge_api_structs::dtos::ReminderDTO as Reminder;
pub use nudge_domain::{ReminderType, UserChoice, ID};

/// Nudge Server SDK
///
/// The SDK contains methods for interacting with the Nudge server
/// API.
#[derive(Clone)]
pub struct NudgeSDK {
    pub receiver: ReceiverClient,
    pub reminder: ReminderClient,
    pub status: StatusClient,
}

impl NudgeSDK {
    pub fn new<T: Into<String>>(address: String, api_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key.into());
        let base = Arc::new(base);
        let receiver = ReceiverClient::new(base.clone());
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base);

        Self {
            receiver,
            reminder,
            status,
        }
    }
}
