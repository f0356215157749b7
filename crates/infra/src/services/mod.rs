mod delivery;
mod team_hook;

pub use delivery::{
    DeliveryOutcome, IDeliveryChannel, InMemoryDeliveryChannel, WebhookDeliveryChannel,
};
pub use team_hook::{
    ITeamLifecycleHook, InMemoryTeamLifecycleHook, LoggingTeamLifecycleHook,
    WebhookTeamLifecycleHook,
};
