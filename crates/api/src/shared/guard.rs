use crate::error::NudgeError;
use nudge_domain::ReminderType;

pub struct Guard {}

impl Guard {
    pub fn against_malformed_reminder_type(val: &str) -> Result<ReminderType, NudgeError> {
        val.parse()
            .map_err(|e| NudgeError::BadClientData(format!("{}", e)))
    }

    /// Epoch seconds have to be a finite number
    pub fn against_malformed_epoch_secs(val: f64) -> Result<f64, NudgeError> {
        if val.is_finite() {
            Ok(val)
        } else {
            Err(NudgeError::BadClientData(format!(
                "`{}` is not a valid amount of epoch seconds",
                val
            )))
        }
    }
}
