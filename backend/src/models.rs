use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i32,
    pub name: String,
    pub roll_number: i32,
    pub registration_number: i32,
    pub department: String,
    pub semester: String,
    pub session: String,
    pub phone: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Teacher {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Public view of a teacher row, returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TeacherProfile {
    pub id: i32,
    pub name: String,
    pub email: String,
}

impl From<Teacher> for TeacherProfile {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            email: teacher.email,
        }
    }
}

/// One row of the `results` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ExamResult {
    pub id: i32,
    pub student_id: i32,
    pub subject: String,
    pub marks: i32,
    pub grade: String,
    pub exam_type: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub id: i32,
    pub student_id: i32,
    pub date: NaiveDate,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PerformanceNote {
    pub id: i32,
    pub student_id: i32,
    pub remarks: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notice {
    pub id: i32,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Exam {
    pub id: i32,
    pub subject: String,
    pub exam_date: NaiveDate,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: i32,
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub details: Option<String>,
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TeacherLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentLoginRequest {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub roll_number: i32,
    pub registration_number: i32,
    pub department: String,
    pub semester: String,
    pub session: String,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditStudentRequest {
    pub student_id: i32,
    pub name: String,
    pub roll_number: i32,
    pub department: String,
}

#[derive(Debug, Deserialize)]
pub struct StudentIdRequest {
    pub student_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct AddResultRequest {
    pub student_id: i32,
    pub subject: String,
    pub marks: i32,
    pub grade: String,
    pub exam_type: String,
}

#[derive(Debug, Deserialize)]
pub struct AddAttendanceRequest {
    pub student_id: i32,
    pub date: Option<String>, // YYYY-MM-DD, defaults to today
    pub status: AttendanceStatus,
}

#[derive(Debug, Deserialize)]
pub struct AddPerformanceRequest {
    pub student_id: i32,
    pub remarks: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct AddNoticeRequest {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct AddExamRequest {
    pub subject: String,
    pub exam_date: String,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAssignmentRequest {
    pub title: String,
    pub subject: String,
    pub due_date: String,
    pub details: Option<String>,
}

// ============================================================================
// Store inputs
// ============================================================================

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: i32,
    pub registration_number: i32,
    pub department: String,
    pub semester: String,
    pub session: String,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentUpdate {
    pub name: String,
    pub roll_number: i32,
    pub department: String,
}

#[derive(Debug, Clone)]
pub struct NewResult {
    pub student_id: i32,
    pub subject: String,
    pub marks: i32,
    pub grade: String,
    pub exam_type: String,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub student_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone)]
pub struct NewPerformance {
    pub student_id: i32,
    pub remarks: String,
    pub rating: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewExam {
    pub subject: String,
    pub exam_date: NaiveDate,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub subject: String,
    pub due_date: NaiveDate,
    pub details: Option<String>,
}
