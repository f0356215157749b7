use crate::date::millis_to_secs;
use crate::shared::entity::{Entity, ID};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// One of the two independent recurring reminder tracks a team is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Small refresh of the published content
    Minor,
    /// Full rewrite of the published content
    Major,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    Minor,
    Major,
    ConfirmMinor,
    ConfirmMajor,
}

impl ReminderType {
    pub const ALL: [ReminderType; 4] = [
        ReminderType::Minor,
        ReminderType::Major,
        ReminderType::ConfirmMinor,
        ReminderType::ConfirmMajor,
    ];

    /// The cadence slot this type occupies. A confirmation reminder
    /// occupies the slot of its parent cadence.
    pub fn cadence(&self) -> Cadence {
        match self {
            Self::Minor | Self::ConfirmMinor => Cadence::Minor,
            Self::Major | Self::ConfirmMajor => Cadence::Major,
        }
    }

    pub fn is_confirmation(&self) -> bool {
        matches!(self, Self::ConfirmMinor | Self::ConfirmMajor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "MINOR",
            Self::Major => "MAJOR",
            Self::ConfirmMinor => "CONFIRM_MINOR",
            Self::ConfirmMajor => "CONFIRM_MAJOR",
        }
    }

    /// Human readable name used in operator notices
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Minor => "minor update",
            Self::Major => "major update",
            Self::ConfirmMinor => "minor update confirmation",
            Self::ConfirmMajor => "major update confirmation",
        }
    }

    /// The templated notification sent when a reminder of this type fires
    pub fn message(&self) -> ReminderMessage {
        let (text, choices) = match self {
            Self::Minor => (
                "Minor update\n\nHi, it is time to refresh your team's post. \
                 Send the updated post to the admins.\n\n\
                 Please pick one of the options below so that the next reminder can be scheduled.",
                cadence_choices(),
            ),
            Self::Major => (
                "Major update\n\nHi, it is time to fully rewrite your team's post. \
                 Send the new post to the admins.\n\n\
                 Please pick one of the options below so that the next reminder can be scheduled.",
                cadence_choices(),
            ),
            Self::ConfirmMinor | Self::ConfirmMajor => (
                "Update confirmation\n\nHi, have you already sent the new post to the admins?\n\n\
                 Please pick one of the options below so that the next reminder can be scheduled.",
                confirmation_choices(),
            ),
        };

        ReminderMessage {
            reminder_type: *self,
            text: text.to_string(),
            choices,
        }
    }
}

fn cadence_choices() -> Vec<InteractiveChoice> {
    vec![
        InteractiveChoice::new("We will send a new post", UserChoice::AgreedToUpdate),
        InteractiveChoice::new("Not updating this time", UserChoice::DeclinedUpdate),
    ]
}

fn confirmation_choices() -> Vec<InteractiveChoice> {
    vec![
        InteractiveChoice::new("Sent", UserChoice::ConfirmedSent),
        InteractiveChoice::new("Changed our mind", UserChoice::ChangedMind),
    ]
}

impl Display for ReminderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown reminder type: `{0}`")]
pub struct InvalidReminderTypeError(pub String);

impl FromStr for ReminderType {
    type Err = InvalidReminderTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "MINOR" => Ok(Self::Minor),
            "MAJOR" => Ok(Self::Major),
            "CONFIRM_MINOR" => Ok(Self::ConfirmMinor),
            "CONFIRM_MAJOR" => Ok(Self::ConfirmMajor),
            _ => Err(InvalidReminderTypeError(s.to_string())),
        }
    }
}

/// The answer a user gives through one of the interactive choices of a reminder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserChoice {
    AgreedToUpdate,
    DeclinedUpdate,
    ConfirmedSent,
    ChangedMind,
}

impl UserChoice {
    pub const ALL: [UserChoice; 4] = [
        UserChoice::AgreedToUpdate,
        UserChoice::DeclinedUpdate,
        UserChoice::ConfirmedSent,
        UserChoice::ChangedMind,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgreedToUpdate => "agreed_to_update",
            Self::DeclinedUpdate => "declined_update",
            Self::ConfirmedSent => "confirmed_sent",
            Self::ChangedMind => "changed_mind",
        }
    }
}

impl Display for UserChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown user choice: `{0}`")]
pub struct InvalidUserChoiceError(pub String);

impl FromStr for UserChoice {
    type Err = InvalidUserChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserChoice::ALL
            .iter()
            .find(|choice| choice.as_str() == s)
            .copied()
            .ok_or_else(|| InvalidUserChoiceError(s.to_string()))
    }
}

/// A labeled action the recipient of a reminder can invoke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractiveChoice {
    pub label: String,
    pub choice: UserChoice,
}

impl InteractiveChoice {
    pub fn new(label: &str, choice: UserChoice) -> Self {
        Self {
            label: label.to_string(),
            choice,
        }
    }
}

/// The notification delivered to a receiver when a reminder fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderMessage {
    pub reminder_type: ReminderType,
    pub text: String,
    pub choices: Vec<InteractiveChoice>,
}

/// A `Reminder` is one outstanding notification commitment towards a receiver.
/// It always has exactly one live `Job` in the scheduler while it exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    /// Derived from type, receiver and creation time, see `Reminder::derive_id`
    pub id: String,
    /// The scheduler `Job` that will deliver this `Reminder`
    pub job_id: ID,
    /// User id and team id are the same value, one team per user
    pub receiver_id: i64,
    pub reminder_type: ReminderType,
    /// Timestamp in millis at which the receiver should be notified
    pub remind_at: i64,
    /// Timestamp in millis, never changes
    pub created_at: i64,
}

impl Reminder {
    /// Deterministic identity, e.g. `MINOR-42-1700000000`.
    /// Doubles as a trace key when diagnosing a receiver's reminders.
    pub fn derive_id(reminder_type: ReminderType, receiver_id: i64, created_at: i64) -> String {
        format!(
            "{}-{}-{}",
            reminder_type.as_str(),
            receiver_id,
            millis_to_secs(created_at)
        )
    }
}

impl Entity<String> for Reminder {
    fn id(&self) -> String {
        self.id.clone()
    }
}
