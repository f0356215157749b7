mod config;
mod repos;
mod scheduler;
mod services;
mod system;

use anyhow::Context;
pub use config::{Config, WebhookSettings};
pub use repos::{IJobRepo, IReminderRepo, Repos};
pub use scheduler::{FiredJobs, JobScheduler};
pub use services::*;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys, TokioClockSys};

#[derive(Clone)]
pub struct NudgeContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub scheduler: Arc<JobScheduler>,
    pub channel: Arc<dyn IDeliveryChannel>,
    pub team_hook: Arc<dyn ITeamLifecycleHook>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl NudgeContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let delivery_webhook = config
            .delivery_webhook
            .clone()
            .context("DELIVERY_WEBHOOK_URL env var to be present")?;
        let team_hook: Arc<dyn ITeamLifecycleHook> = match &config.team_hook_url {
            Some(url) => Arc::new(WebhookTeamLifecycleHook::new(url.clone())),
            None => Arc::new(LoggingTeamLifecycleHook {}),
        };

        let repos = Repos::create_postgres(&params.postgres_connection_string)
            .await
            .context("Postgres credentials must be set and valid")?;
        let sys: Arc<dyn ISys> = Arc::new(RealSys {});
        let scheduler = Arc::new(JobScheduler::new(repos.jobs.clone(), sys.clone()));

        Ok(Self {
            repos,
            config,
            sys,
            scheduler,
            channel: Arc::new(WebhookDeliveryChannel::new(delivery_webhook)),
            team_hook,
        })
    }

    /// Context backed by in-memory repositories and services, used by tests
    pub fn create_inmemory(sys: Arc<dyn ISys>) -> Self {
        let repos = Repos::create_inmemory();
        let scheduler = Arc::new(JobScheduler::new(repos.jobs.clone(), sys.clone()));
        Self {
            repos,
            config: Config::new(),
            sys,
            scheduler,
            channel: Arc::new(InMemoryDeliveryChannel::new()),
            team_hook: Arc::new(InMemoryTeamLifecycleHook::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<NudgeContext> {
    NudgeContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .with_context(|| format!("{} env var to be present.", PSQL_CONNECTION_STRING))
}
