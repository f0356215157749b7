mod cancel_all_reminders;
pub mod teardown_team;

use actix_web::web;
use cancel_all_reminders::cancel_all_reminders_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/receivers/{receiver_id}/reminders",
        web::delete().to(cancel_all_reminders_controller),
    );
}
