pub mod date;
mod job;
mod reminder;
mod shared;
mod transition;

pub use job::{Job, JobPayload, JobPayloadError, SendReminderPayload, DATE_TRIGGER};
pub use reminder::{
    Cadence, InteractiveChoice, InvalidReminderTypeError, InvalidUserChoiceError, Reminder,
    ReminderMessage, ReminderType, UserChoice,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use transition::{next_reminders, NextReminder, ReminderIntervals, TransitionError, Trigger};
