mod inmemory;
mod webhook;

pub use inmemory::InMemoryTeamLifecycleHook;
use tracing::warn;
pub use webhook::WebhookTeamLifecycleHook;

/// Told whenever this server decides on its own that a team has to go
#[async_trait::async_trait]
pub trait ITeamLifecycleHook: Send + Sync {
    async fn on_team_deleted(&self, receiver_id: i64, reason: &str) -> anyhow::Result<()>;
}

/// Used when nobody subscribed to team deletions
pub struct LoggingTeamLifecycleHook {}

#[async_trait::async_trait]
impl ITeamLifecycleHook for LoggingTeamLifecycleHook {
    async fn on_team_deleted(&self, receiver_id: i64, reason: &str) -> anyhow::Result<()> {
        warn!(
            "Team {} was deleted ({}), but no TEAM_HOOK_URL is configured to hear about it",
            receiver_id, reason
        );
        Ok(())
    }
}
