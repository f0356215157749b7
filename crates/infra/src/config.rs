use chrono::Duration;
use nudge_domain::ReminderIntervals;
use nudge_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct WebhookSettings {
    pub url: String,
    /// Sent in the `nudge-webhook-key` header so that the receiving end
    /// can verify that the request came from this server
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret that every client has to provide in the `nudge-api-key` header
    pub api_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// Delays used when arming the different reminder types
    pub reminder_intervals: ReminderIntervals,
    /// Where reminders and operator notices are delivered
    pub delivery_webhook: Option<WebhookSettings>,
    /// Where team deletions decided by this server are announced.
    /// Only logged when not set.
    pub team_hook_url: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let api_key = match std::env::var("NUDGE_API_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find NUDGE_API_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Api key was generated and set to: {}", key);
                key
            }
        };
        let default_port = 5000;
        let port = match std::env::var("PORT") {
            Ok(port) => match port.parse::<usize>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(
                        "The given PORT: {} is not valid, falling back to the default port: {}.",
                        port, default_port
                    );
                    default_port
                }
            },
            Err(_) => default_port,
        };

        let defaults = ReminderIntervals::default();
        let reminder_intervals = ReminderIntervals {
            minor: interval_from_env("MINOR_REMINDER_INTERVAL_SECS", defaults.minor),
            major: interval_from_env("MAJOR_REMINDER_INTERVAL_SECS", defaults.major),
            confirm: interval_from_env("CONFIRM_REMINDER_INTERVAL_SECS", defaults.confirm),
        };

        let delivery_webhook = std::env::var("DELIVERY_WEBHOOK_URL")
            .ok()
            .map(|url| WebhookSettings {
                url,
                key: std::env::var("DELIVERY_WEBHOOK_KEY").unwrap_or_else(|_| {
                    info!("Did not find DELIVERY_WEBHOOK_KEY environment variable. Going to create one.");
                    let key = create_random_secret(30);
                    info!("Delivery webhook key was generated and set to: {}", key);
                    key
                }),
            });

        Self {
            api_key,
            port,
            reminder_intervals,
            delivery_webhook,
            team_hook_url: std::env::var("TEAM_HOOK_URL").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn interval_from_env(var: &str, default: Duration) -> Duration {
    match std::env::var(var) {
        Ok(value) => parse_interval(&value).unwrap_or_else(|| {
            warn!(
                "The given {}: {} is not a valid amount of seconds, falling back to the default: {} seconds.",
                var,
                value,
                default.num_seconds()
            );
            default
        }),
        Err(_) => default,
    }
}

/// Longest delay a reminder can be armed with, 100 years
const MAX_INTERVAL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

fn parse_interval(secs: &str) -> Option<Duration> {
    match secs.trim().parse::<i64>() {
        Ok(secs) if secs > 0 && secs <= MAX_INTERVAL_SECS => Some(Duration::seconds(secs)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_intervals_only() {
        assert_eq!(parse_interval("10"), Some(Duration::seconds(10)));
        assert_eq!(parse_interval(" 7776000 "), Some(Duration::days(90)));
        assert_eq!(parse_interval("0"), None);
        assert_eq!(parse_interval("-5"), None);
        assert_eq!(parse_interval("ten"), None);
    }

    #[test]
    fn rejects_intervals_out_of_range() {
        assert_eq!(
            parse_interval(&MAX_INTERVAL_SECS.to_string()),
            Some(Duration::seconds(MAX_INTERVAL_SECS))
        );
        assert_eq!(parse_interval(&(MAX_INTERVAL_SECS + 1).to_string()), None);
        assert_eq!(parse_interval(&i64::MAX.to_string()), None);
        assert_eq!(parse_interval("99999999999999999999999"), None);
    }

    #[test]
    fn falls_back_to_default_interval() {
        let default = Duration::days(14);
        assert_eq!(
            interval_from_env("NUDGE_TEST_SURELY_UNSET_INTERVAL", default),
            default
        );
    }
}
