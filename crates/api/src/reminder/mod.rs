mod arm_reminder;
pub mod enable_reminders;
mod get_receiver_reminders;
mod get_reminder;
pub mod rearm_reminder;
mod reschedule_reminder;
pub mod respond_to_reminder;
pub mod send_reminder;
mod subscribers;

use actix_web::web;
use enable_reminders::enable_reminders_controller;
use get_receiver_reminders::get_receiver_reminders_controller;
use get_reminder::get_reminder_controller;
use nudge_domain::Reminder;
use nudge_infra::NudgeContext;
use rearm_reminder::rearm_reminder_controller;
use reschedule_reminder::reschedule_reminder_controller;
use respond_to_reminder::respond_to_reminder_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/receivers/{receiver_id}/reminders",
        web::post().to(enable_reminders_controller),
    );
    cfg.route(
        "/receivers/{receiver_id}/reminders",
        web::get().to(get_receiver_reminders_controller),
    );
    cfg.route(
        "/receivers/{receiver_id}/responses",
        web::post().to(respond_to_reminder_controller),
    );
    cfg.route(
        "/receivers/{receiver_id}/reminders/{reminder_type}/rearm",
        web::post().to(rearm_reminder_controller),
    );

    cfg.route(
        "/reminders/{reminder_id}",
        web::get().to(get_reminder_controller),
    );
    cfg.route(
        "/reminders/{reminder_id}",
        web::put().to(reschedule_reminder_controller),
    );
}

/// Removes the reminder record first and then its job, so that a job
/// firing in between finds no reminder and delivers nothing
pub(crate) async fn cancel_reminder(reminder: &Reminder, ctx: &NudgeContext) -> anyhow::Result<()> {
    ctx.repos.reminders.delete(&reminder.id).await?;
    ctx.scheduler.remove_job(&reminder.job_id).await?;
    Ok(())
}
