use actix_web::{get, post, web, HttpResponse, Responder};

use crate::models::{AddAssignmentRequest, AddExamRequest, AddNoticeRequest, NewAssignment, NewExam};
use crate::records::parse_date;
use crate::responses::{created, require_fields, server_error, store_error};
use crate::students::ANNOUNCEMENT_LIMIT;
use crate::AppState;

/// Latest notices, newest first, as a bare array.
#[get("/announcements")]
async fn list_announcements(app_state: web::Data<AppState>) -> impl Responder {
    match app_state.store.recent_notices(ANNOUNCEMENT_LIMIT).await {
        Ok(notices) => HttpResponse::Ok().json(notices),
        Err(e) => server_error("Failed to fetch announcements", &e, "Failed to fetch announcements"),
    }
}

#[post("/add-notice")]
async fn add_notice(
    app_state: web::Data<AppState>,
    req: web::Json<AddNoticeRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("title", req.title.as_str()),
        ("body", req.body.as_str()),
    ]) {
        return response;
    }

    match app_state
        .store
        .add_notice(req.title.trim(), req.body.trim())
        .await
    {
        Ok(id) => created("Notice added successfully", id),
        Err(e) => store_error(e, "Failed to add notice", "Notice not found", "Failed to add notice"),
    }
}

#[post("/add-exam")]
async fn add_exam(app_state: web::Data<AppState>, req: web::Json<AddExamRequest>) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("subject", req.subject.as_str()),
        ("exam_date", req.exam_date.as_str()),
    ]) {
        return response;
    }

    let exam_date = match parse_date("exam_date", &req.exam_date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let req = req.into_inner();
    let exam = NewExam {
        subject: req.subject.trim().to_string(),
        exam_date,
        details: req.details.filter(|d| !d.trim().is_empty()),
    };

    match app_state.store.add_exam(exam).await {
        Ok(id) => created("Exam added successfully", id),
        Err(e) => store_error(e, "Failed to add exam", "Exam not found", "Failed to add exam"),
    }
}

#[post("/add-assignment")]
async fn add_assignment(
    app_state: web::Data<AppState>,
    req: web::Json<AddAssignmentRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("title", req.title.as_str()),
        ("subject", req.subject.as_str()),
        ("due_date", req.due_date.as_str()),
    ]) {
        return response;
    }

    let due_date = match parse_date("due_date", &req.due_date) {
        Ok(date) => date,
        Err(response) => return response,
    };

    let req = req.into_inner();
    let assignment = NewAssignment {
        title: req.title.trim().to_string(),
        subject: req.subject.trim().to_string(),
        due_date,
        details: req.details.filter(|d| !d.trim().is_empty()),
    };

    match app_state.store.add_assignment(assignment).await {
        Ok(id) => created("Assignment added successfully", id),
        Err(e) => store_error(
            e,
            "Failed to add assignment",
            "Assignment not found",
            "Failed to add assignment",
        ),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_announcements)
        .service(add_notice)
        .service(add_exam)
        .service(add_assignment);
}
