use super::ITeamLifecycleHook;
use std::sync::Mutex;

/// Remembers every team deletion it was told about
pub struct InMemoryTeamLifecycleHook {
    deleted: Mutex<Vec<(i64, String)>>,
}

impl InMemoryTeamLifecycleHook {
    pub fn new() -> Self {
        Self {
            deleted: Mutex::new(vec![]),
        }
    }

    pub fn deleted_teams(&self) -> Vec<(i64, String)> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Default for InMemoryTeamLifecycleHook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ITeamLifecycleHook for InMemoryTeamLifecycleHook {
    async fn on_team_deleted(&self, receiver_id: i64, reason: &str) -> anyhow::Result<()> {
        self.deleted
            .lock()
            .unwrap()
            .push((receiver_id, reason.to_string()));
        Ok(())
    }
}
