use super::ITeamLifecycleHook;
use reqwest::Client;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TeamDeletedEvent<'a> {
    receiver_id: i64,
    reason: &'a str,
}

pub struct WebhookTeamLifecycleHook {
    client: Client,
    url: String,
}

impl WebhookTeamLifecycleHook {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl ITeamLifecycleHook for WebhookTeamLifecycleHook {
    async fn on_team_deleted(&self, receiver_id: i64, reason: &str) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&TeamDeletedEvent {
                receiver_id,
                reason,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
