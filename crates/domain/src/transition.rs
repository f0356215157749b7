use crate::reminder::{ReminderType, UserChoice};
use chrono::Duration;
use thiserror::Error;

/// Delays between reminders of each kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderIntervals {
    pub minor: Duration,
    pub major: Duration,
    pub confirm: Duration,
}

impl ReminderIntervals {
    /// The delay a reminder of the given type is armed with
    pub fn delay_for(&self, reminder_type: ReminderType) -> Duration {
        match reminder_type {
            ReminderType::Minor => self.minor,
            ReminderType::Major => self.major,
            ReminderType::ConfirmMinor | ReminderType::ConfirmMajor => self.confirm,
        }
    }
}

impl Default for ReminderIntervals {
    fn default() -> Self {
        Self {
            minor: Duration::days(3 * 30),
            major: Duration::days(6 * 30),
            confirm: Duration::days(14),
        }
    }
}

/// What caused the reminder state machine to be consulted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// The receiver opted in to reminders for the first time
    OptIn,
    /// The receiver answered a reminder of the given type.
    /// `None` means the caller lost track of which reminder was answered.
    Response(Option<ReminderType>, UserChoice),
    /// An operator asked for the given type to be (re)armed at its own cadence
    Rearm(ReminderType),
}

/// A reminder the caller should arm as a consequence of a `Trigger`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextReminder {
    pub reminder_type: ReminderType,
    pub delay: Duration,
}

#[derive(Error, Debug, PartialEq)]
pub enum TransitionError {
    #[error("A response was received without the type of the reminder it answers")]
    MissingReminderType,
    #[error("There is no transition from a `{0}` reminder on `{1}`")]
    Undefined(ReminderType, UserChoice),
}

/// Computes which reminders to arm next. Confirmation reminders always collapse
/// back to their parent cadence, the answer itself never changes the schedule.
pub fn next_reminders(
    trigger: Trigger,
    intervals: &ReminderIntervals,
) -> Result<Vec<NextReminder>, TransitionError> {
    use ReminderType::*;
    use UserChoice::*;

    let arm = |reminder_type: ReminderType| NextReminder {
        reminder_type,
        delay: intervals.delay_for(reminder_type),
    };

    let (current, choice) = match trigger {
        Trigger::OptIn => return Ok(vec![arm(Minor), arm(Major)]),
        Trigger::Rearm(reminder_type) => return Ok(vec![arm(reminder_type)]),
        Trigger::Response(None, _) => return Err(TransitionError::MissingReminderType),
        Trigger::Response(Some(current), choice) => (current, choice),
    };

    let next = match (current, choice) {
        (Minor, AgreedToUpdate) => ConfirmMinor,
        (Minor, DeclinedUpdate) => Minor,
        (Major, AgreedToUpdate) => ConfirmMajor,
        (Major, DeclinedUpdate) => Major,
        (ConfirmMinor, ConfirmedSent) | (ConfirmMinor, ChangedMind) => Minor,
        (ConfirmMajor, ConfirmedSent) | (ConfirmMajor, ChangedMind) => Major,
        (Minor, ConfirmedSent)
        | (Minor, ChangedMind)
        | (Major, ConfirmedSent)
        | (Major, ChangedMind)
        | (ConfirmMinor, AgreedToUpdate)
        | (ConfirmMinor, DeclinedUpdate)
        | (ConfirmMajor, AgreedToUpdate)
        | (ConfirmMajor, DeclinedUpdate) => {
            return Err(TransitionError::Undefined(current, choice))
        }
    };

    Ok(vec![arm(next)])
}
