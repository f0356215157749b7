use nudge_infra::NudgeContext;
use tracing::{error, warn};

/// Sends a notice to the operators. A notice that cannot be delivered is logged instead.
pub async fn notify_operators(text: &str, ctx: &NudgeContext) {
    warn!("Operator notice: {}", text);
    if let Err(e) = ctx.channel.notify_operators(text).await {
        error!(
            "Unable to notify operators: {:?}. The notice was: {}",
            e, text
        );
    }
}
