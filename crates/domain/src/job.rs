use crate::reminder::{InteractiveChoice, ReminderMessage, ReminderType};
use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All jobs are single-shot and triggered at an absolute point in time
pub const DATE_TRIGGER: &str = "date";

/// A single-shot unit of scheduled work, persisted independently of the process
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub id: ID,
    pub payload: JobPayload,
    pub run_date: DateTime<Utc>,
    /// How late the job may still fire. `None` means it always fires,
    /// no matter how long the scheduler was down.
    pub misfire_grace: Option<Duration>,
}

impl Job {
    pub fn new(payload: JobPayload, run_date: DateTime<Utc>) -> Self {
        Self {
            id: Default::default(),
            payload,
            run_date,
            misfire_grace: None,
        }
    }

    /// Whether the job is too late to fire when it is due at `now_millis`
    pub fn is_misfired(&self, now_millis: i64) -> bool {
        match self.misfire_grace {
            Some(grace) => now_millis - self.run_date.timestamp_millis() > grace.num_milliseconds(),
            None => false,
        }
    }
}

impl Entity<ID> for Job {
    fn id(&self) -> ID {
        self.id.clone()
    }
}

/// The closed set of job kinds the scheduler knows how to run.
/// Each kind carries its own strongly typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPayload {
    SendReminder(SendReminderPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReminderPayload {
    pub receiver_id: i64,
    pub reminder_id: String,
    pub reminder_type: ReminderType,
    pub text: String,
    pub choices: Vec<InteractiveChoice>,
}

impl SendReminderPayload {
    pub fn new(receiver_id: i64, reminder_id: String, message: ReminderMessage) -> Self {
        Self {
            receiver_id,
            reminder_id,
            reminder_type: message.reminder_type,
            text: message.text,
            choices: message.choices,
        }
    }

    pub fn message(&self) -> ReminderMessage {
        ReminderMessage {
            reminder_type: self.reminder_type,
            text: self.text.clone(),
            choices: self.choices.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum JobPayloadError {
    #[error("Unknown job kind: `{0}`")]
    UnknownKind(String),
    #[error("Malformed arguments for job kind `{0}`: {1}")]
    MalformedArguments(String, serde_json::Error),
}

impl JobPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SendReminder(_) => "send_reminder",
        }
    }

    /// The receiver this job does its work for
    pub fn receiver_id(&self) -> i64 {
        match self {
            Self::SendReminder(payload) => payload.receiver_id,
        }
    }

    /// Serialized arguments, stored next to `kind`
    pub fn arguments(&self) -> serde_json::Value {
        match self {
            // Serializing a struct of plain fields to a `Value` cannot fail
            Self::SendReminder(payload) => {
                serde_json::to_value(payload).unwrap_or(serde_json::Value::Null)
            }
        }
    }

    pub fn from_parts(kind: &str, arguments: serde_json::Value) -> Result<Self, JobPayloadError> {
        match kind {
            "send_reminder" => serde_json::from_value(arguments)
                .map(Self::SendReminder)
                .map_err(|e| JobPayloadError::MalformedArguments(kind.to_string(), e)),
            _ => Err(JobPayloadError::UnknownKind(kind.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload() -> JobPayload {
        JobPayload::SendReminder(SendReminderPayload::new(
            7,
            "MINOR-7-100".into(),
            ReminderType::Minor.message(),
        ))
    }

    #[test]
    fn payload_survives_being_split_into_kind_and_arguments() {
        let payload = payload();
        let restored = JobPayload::from_parts(payload.kind(), payload.arguments()).unwrap();
        assert_eq!(restored, payload);
        assert_eq!(restored.receiver_id(), 7);
    }

    #[test]
    fn rejects_unknown_job_kinds() {
        let res = JobPayload::from_parts("send_invoice", serde_json::json!({}));
        assert!(matches!(res, Err(JobPayloadError::UnknownKind(_))));
    }

    #[test]
    fn jobs_without_grace_never_misfire() {
        let run_date = Utc.timestamp_millis(1_000);
        let mut job = Job::new(payload(), run_date);
        assert!(!job.is_misfired(1_000 + 1000 * 60 * 60 * 24 * 365));

        job.misfire_grace = Some(Duration::seconds(10));
        assert!(!job.is_misfired(11_000));
        assert!(job.is_misfired(11_001));
    }
}
