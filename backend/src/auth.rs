use actix_web::{post, web, HttpResponse, Responder};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{error, info};
use rand_core::OsRng;
use serde_json::json;

use crate::models::{StudentLoginRequest, TeacherLoginRequest, TeacherProfile};
use crate::responses::{require_fields, server_error, unauthorized, MessageResponse};
use crate::AppState;

/// Well-formed Argon2id hash with the default parameters that no password
/// matches. Unknown accounts are checked against it so they cost as much as
/// a wrong password.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$cG9ydGFsLWR1bW15LXNhbHQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Checks `password` against a stored PHC string. A hash that cannot be
/// parsed never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash) {
        Ok(hash) => hash,
        Err(e) => {
            error!("Failed to parse password hash: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[post("/api/teacher-login")]
async fn teacher_login(
    app_state: web::Data<AppState>,
    credentials: web::Json<TeacherLoginRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("email", credentials.email.as_str()),
        ("password", credentials.password.as_str()),
    ]) {
        return response;
    }

    let teacher = match app_state
        .store
        .find_teacher_by_email(credentials.email.trim())
        .await
    {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            verify_password(&credentials.password, DUMMY_HASH);
            return unauthorized("Invalid email or password");
        }
        Err(e) => return server_error("Teacher login failed", &e, "Server error during login"),
    };

    if !verify_password(&credentials.password, &teacher.password_hash) {
        return unauthorized("Invalid email or password");
    }

    info!("Teacher {} logged in", teacher.id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "teacher": TeacherProfile::from(teacher),
    }))
}

#[post("/api/student-login")]
async fn student_login(
    app_state: web::Data<AppState>,
    credentials: web::Json<StudentLoginRequest>,
) -> impl Responder {
    if let Err(response) = require_fields(&[
        ("identifier", credentials.identifier.as_str()),
        ("password", credentials.password.as_str()),
    ]) {
        return response;
    }

    // The identifier is the roll number; anything non-numeric cannot match.
    let roll_number = match credentials.identifier.trim().parse::<i32>() {
        Ok(roll) => roll,
        Err(_) => {
            verify_password(&credentials.password, DUMMY_HASH);
            return unauthorized("Invalid roll number or password");
        }
    };

    let student = match app_state.store.find_student_by_roll(roll_number).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            verify_password(&credentials.password, DUMMY_HASH);
            return unauthorized("Invalid roll number or password");
        }
        Err(e) => {
            return server_error(
                "Student login failed",
                &e,
                "Server error during student login",
            )
        }
    };

    let password_valid = match student.password_hash.as_deref() {
        Some(hash) => verify_password(&credentials.password, hash),
        None => {
            verify_password(&credentials.password, DUMMY_HASH);
            false
        }
    };

    if !password_valid {
        return unauthorized("Invalid roll number or password");
    }

    info!("Student {} logged in", student.id);

    HttpResponse::Ok().json(json!({
        "success": true,
        "student": student,
    }))
}

/// There is no server-side session to tear down; the client just forgets
/// who is logged in.
#[post("/logout")]
async fn logout() -> impl Responder {
    HttpResponse::Ok().json(MessageResponse::new("Logout successful"))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(teacher_login)
        .service(student_login)
        .service(logout);
}
