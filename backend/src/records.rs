use actix_web::{post, web, Responder};
use chrono::{NaiveDate, Utc};

use crate::models::{
    AddAttendanceRequest, AddPerformanceRequest, AddResultRequest, NewAttendance, NewPerformance,
    NewResult,
};
use crate::responses::{bad_request, created, require_fields, store_error};
use crate::AppState;

// ============================================================================
// Student-owned rows: results, attendance, performance
// ============================================================================

pub(crate) fn parse_date(field: &str, value: &str) -> Result<NaiveDate, actix_web::HttpResponse> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| bad_request(format!("Invalid {} format. Use YYYY-MM-DD", field)))
}

#[post("/add-result")]
async fn add_result(
    app_state: web::Data<AppState>,
    req: web::Json<AddResultRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("subject", req.subject.as_str()),
        ("grade", req.grade.as_str()),
        ("exam_type", req.exam_type.as_str()),
    ]) {
        return response;
    }

    let req = req.into_inner();
    let result = NewResult {
        student_id: req.student_id,
        subject: req.subject.trim().to_string(),
        marks: req.marks,
        grade: req.grade.trim().to_string(),
        exam_type: req.exam_type.trim().to_string(),
    };

    match app_state.store.add_result(result).await {
        Ok(id) => created("Result added successfully", id),
        Err(e) => store_error(
            e,
            "Failed to add result",
            "Student not found",
            "Failed to add result",
        ),
    }
}

#[post("/add-attendance")]
async fn add_attendance(
    app_state: web::Data<AppState>,
    req: web::Json<AddAttendanceRequest>,
) -> impl Responder {
    let date = match req.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(value) => match parse_date("date", value) {
            Ok(date) => date,
            Err(response) => return response,
        },
        None => Utc::now().date_naive(),
    };

    let record = NewAttendance {
        student_id: req.student_id,
        date,
        status: req.status,
    };

    match app_state.store.add_attendance(record).await {
        Ok(id) => created("Attendance recorded successfully", id),
        Err(e) => store_error(
            e,
            "Failed to add attendance",
            "Student not found",
            "Failed to add attendance",
        ),
    }
}

#[post("/add-performance")]
async fn add_performance(
    app_state: web::Data<AppState>,
    req: web::Json<AddPerformanceRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[("remarks", req.remarks.as_str())]) {
        return response;
    }

    let req = req.into_inner();
    let note = NewPerformance {
        student_id: req.student_id,
        remarks: req.remarks.trim().to_string(),
        rating: req.rating,
    };

    match app_state.store.add_performance(note).await {
        Ok(id) => created("Performance note added successfully", id),
        Err(e) => store_error(
            e,
            "Failed to add performance note",
            "Student not found",
            "Failed to add performance note",
        ),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_result)
        .service(add_attendance)
        .service(add_performance);
}
