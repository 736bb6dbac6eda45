use actix_web::{web, HttpResponse};
use mypa_reminders_api_structs::{dtos::SchedulerStatusDTO, get_service_health::*};
use mypa_reminders_infra::ReminderContext;

async fn status(ctx: web::Data<ReminderContext>) -> HttpResponse {
    let status = ctx
        .scheduler_status
        .read()
        .map(|status| status.clone())
        .unwrap_or_default();

    HttpResponse::Ok().json(APIResponse {
        message: "Yo! We are up!\r\n".into(),
        scheduler: SchedulerStatusDTO {
            phase: status.phase,
            last_tick: status.last_tick,
        },
    })
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
