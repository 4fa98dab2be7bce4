use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::responses::server_error;
use crate::AppState;

const RECENT_STUDENTS: i64 = 5;

/// Summary shown on the teacher dashboard.
#[get("/dashboard-data")]
async fn dashboard_data(app_state: web::Data<AppState>) -> impl Responder {
    let total_students = match app_state.store.count_students().await {
        Ok(count) => count,
        Err(e) => return server_error("Failed to count students", &e, "Failed to fetch dashboard data"),
    };

    let recent_students = match app_state.store.recent_students(RECENT_STUDENTS).await {
        Ok(students) => students,
        Err(e) => {
            return server_error(
                "Failed to fetch recent students",
                &e,
                "Failed to fetch dashboard data",
            )
        }
    };

    HttpResponse::Ok().json(json!({
        "success": true,
        "total_students": total_students,
        "recent_students": recent_students,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(dashboard_data);
}
