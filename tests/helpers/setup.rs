use nudge_api::Application;
use nudge_infra::{Config, NudgeContext, RealSys};
use nudge_sdk::NudgeSDK;
use std::sync::Arc;

pub struct TestApp {
    pub config: Config,
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, NudgeSDK, String) {
    let mut ctx = NudgeContext::create_inmemory(Arc::new(RealSys {}));
    ctx.config.port = 0; // Random port

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let app = TestApp { config };
    let sdk = NudgeSDK::new(address.clone(), app.config.api_key.clone());
    (app, sdk, address)
}
