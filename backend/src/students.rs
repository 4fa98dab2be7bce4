use actix_web::{get, post, web, HttpResponse, Responder};
use log::{error, info};
use serde::Serialize;
use serde_json::json;

use crate::auth::hash_password;
use crate::models::{
    Assignment, AttendanceRecord, CreateStudentRequest, EditStudentRequest, Exam, ExamResult,
    NewStudent, Notice, PerformanceNote, Student, StudentIdRequest, StudentUpdate,
};
use crate::responses::{
    created, not_found, require_fields, server_error, store_error, ErrorResponse,
    MessageResponse,
};
use crate::store::{PortalStore, StoreResult};
use crate::AppState;

/// Upper bound on notices, exams and assignments in a student overview.
pub const ANNOUNCEMENT_LIMIT: i64 = 5;

/// A student row together with the rows that belong to it.
#[derive(Debug, Serialize)]
pub struct StudentRecord {
    pub student: Student,
    pub results: Vec<ExamResult>,
    pub attendance: Vec<AttendanceRecord>,
    pub performance: Option<PerformanceNote>,
}

#[derive(Debug, Serialize)]
pub struct StudentOverview {
    pub success: bool,
    #[serde(flatten)]
    pub record: StudentRecord,
    pub notices: Vec<Notice>,
    pub exams: Vec<Exam>,
    pub assignments: Vec<Assignment>,
}

/// Fetches the student and its owned rows, one query each. `None` when the
/// student does not exist.
pub async fn load_student_record(
    store: &dyn PortalStore,
    student_id: i32,
) -> StoreResult<Option<StudentRecord>> {
    let student = match store.get_student(student_id).await? {
        Some(student) => student,
        None => return Ok(None),
    };

    let results = store.student_results(student_id).await?;
    let attendance = store.student_attendance(student_id).await?;
    let performance = store.student_performance(student_id).await?;

    Ok(Some(StudentRecord {
        student,
        results,
        attendance,
        performance,
    }))
}

pub async fn load_student_overview(
    store: &dyn PortalStore,
    student_id: i32,
) -> StoreResult<Option<StudentOverview>> {
    let record = match load_student_record(store, student_id).await? {
        Some(record) => record,
        None => return Ok(None),
    };

    Ok(Some(StudentOverview {
        success: true,
        record,
        notices: store.recent_notices(ANNOUNCEMENT_LIMIT).await?,
        exams: store.recent_exams(ANNOUNCEMENT_LIMIT).await?,
        assignments: store.recent_assignments(ANNOUNCEMENT_LIMIT).await?,
    }))
}

#[get("/api/students")]
async fn list_students(app_state: web::Data<AppState>) -> impl Responder {
    match app_state.store.list_students().await {
        Ok(students) => HttpResponse::Ok().json(json!({
            "success": true,
            "students": students,
        })),
        Err(e) => server_error("Failed to list students", &e, "Failed to fetch students"),
    }
}

#[get("/api/student/{id}")]
async fn get_student(app_state: web::Data<AppState>, id: web::Path<i32>) -> impl Responder {
    let student_id = id.into_inner();

    match load_student_overview(app_state.store.as_ref(), student_id).await {
        Ok(Some(overview)) => HttpResponse::Ok().json(overview),
        Ok(None) => not_found("Student not found."),
        Err(e) => server_error(
            &format!("Failed to load student {}", student_id),
            &e,
            "Failed to fetch student data.",
        ),
    }
}

#[post("/add-student")]
async fn add_student(
    app_state: web::Data<AppState>,
    req: web::Json<CreateStudentRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("name", req.name.as_str()),
        ("department", req.department.as_str()),
        ("semester", req.semester.as_str()),
        ("session", req.session.as_str()),
    ]) {
        return response;
    }

    let req = req.into_inner();

    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => match hash_password(password) {
            Ok(hash) => Some(hash),
            Err(e) => {
                error!("Failed to hash password: {}", e);
                return HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("Failed to hash password"));
            }
        },
        None => None,
    };

    let student = NewStudent {
        name: req.name.trim().to_string(),
        roll_number: req.roll_number,
        registration_number: req.registration_number,
        department: req.department.trim().to_string(),
        semester: req.semester.trim().to_string(),
        session: req.session.trim().to_string(),
        phone: req.phone.filter(|p| !p.trim().is_empty()),
        password_hash,
    };

    match app_state.store.create_student(student).await {
        Ok(id) => {
            info!("Created student {}", id);
            created("Student added successfully", id)
        }
        Err(e) => store_error(
            e,
            "Failed to add student",
            "Student not found",
            "Failed to add student",
        ),
    }
}

#[post("/edit-student")]
async fn edit_student(
    app_state: web::Data<AppState>,
    req: web::Json<EditStudentRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("name", req.name.as_str()),
        ("department", req.department.as_str()),
    ]) {
        return response;
    }

    let req = req.into_inner();
    let update = StudentUpdate {
        name: req.name.trim().to_string(),
        roll_number: req.roll_number,
        department: req.department.trim().to_string(),
    };

    match app_state.store.update_student(req.student_id, update).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::new("Student updated successfully")),
        Err(e) => store_error(
            e,
            "Failed to update student",
            "Student not found",
            "Failed to update student",
        ),
    }
}

#[post("/delete-student")]
async fn delete_student(
    app_state: web::Data<AppState>,
    req: web::Json<StudentIdRequest>,
) -> impl Responder {
    match app_state.store.delete_student(req.student_id).await {
        Ok(deleted) => {
            info!(
                "Deleted student {} with {} results, {} attendance and {} performance rows",
                req.student_id, deleted.results, deleted.attendance, deleted.performance
            );
            HttpResponse::Ok().json(MessageResponse::new("Student deleted successfully"))
        }
        Err(e) => store_error(
            e,
            "Failed to delete student",
            "Student not found",
            "Failed to delete student",
        ),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_students)
        .service(get_student)
        .service(add_student)
        .service(edit_student)
        .service(delete_student);
}
