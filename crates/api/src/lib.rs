mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;
mod team;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use job_schedulers::start_job_dispatcher;
use nudge_infra::{JobScheduler, NudgeContext};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
    team::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
    scheduler: Arc<JobScheduler>,
}

impl Application {
    pub async fn new(context: NudgeContext) -> anyhow::Result<Self> {
        let scheduler = context.scheduler.clone();
        let (server, port) = Application::configure_server(context.clone())?;
        Application::start_job_schedulers(context).await?;

        Ok(Self {
            server,
            port,
            scheduler,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn start_job_schedulers(context: NudgeContext) -> anyhow::Result<()> {
        start_job_dispatcher(context).await
    }

    fn configure_server(context: NudgeContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        let res = self.server.await;
        self.scheduler.stop();
        res
    }
}
