pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{
    Assignment, AttendanceRecord, Exam, ExamResult, NewAssignment, NewAttendance, NewExam,
    NewPerformance, NewResult, NewStudent, Notice, PerformanceNote, Student, StudentUpdate,
    Teacher,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    Conflict(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Record not found"),
            StoreError::Conflict(s) => write!(f, "Conflicting record: {}", s),
            StoreError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Row counts removed by a student delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeletedRows {
    pub results: u64,
    pub attendance: u64,
    pub performance: u64,
}

/// Every query the HTTP handlers issue. Each method is one statement (or,
/// for `delete_student`, one transaction).
#[async_trait(?Send)]
pub trait PortalStore: Send + Sync {
    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<Teacher>>;
    async fn find_student_by_roll(&self, roll_number: i32) -> StoreResult<Option<Student>>;

    async fn list_students(&self) -> StoreResult<Vec<Student>>;
    async fn get_student(&self, id: i32) -> StoreResult<Option<Student>>;
    async fn count_students(&self) -> StoreResult<i64>;
    async fn recent_students(&self, limit: i64) -> StoreResult<Vec<Student>>;

    async fn student_results(&self, student_id: i32) -> StoreResult<Vec<ExamResult>>;
    async fn student_attendance(&self, student_id: i32) -> StoreResult<Vec<AttendanceRecord>>;
    async fn student_performance(&self, student_id: i32) -> StoreResult<Option<PerformanceNote>>;

    async fn recent_notices(&self, limit: i64) -> StoreResult<Vec<Notice>>;
    async fn recent_exams(&self, limit: i64) -> StoreResult<Vec<Exam>>;
    async fn recent_assignments(&self, limit: i64) -> StoreResult<Vec<Assignment>>;

    async fn create_student(&self, student: NewStudent) -> StoreResult<i32>;
    /// Fails with `NotFound` when no row has the given id.
    async fn update_student(&self, id: i32, update: StudentUpdate) -> StoreResult<()>;
    /// Removes the student's results, attendance and performance rows, then
    /// the student row, atomically. Fails with `NotFound` (and changes
    /// nothing) when the student does not exist.
    async fn delete_student(&self, id: i32) -> StoreResult<DeletedRows>;

    /// The `add_*` methods for student-owned rows fail with `NotFound` when
    /// the referenced student does not exist.
    async fn add_result(&self, result: NewResult) -> StoreResult<i32>;
    async fn add_attendance(&self, record: NewAttendance) -> StoreResult<i32>;
    async fn add_performance(&self, note: NewPerformance) -> StoreResult<i32>;

    async fn add_notice(&self, title: &str, body: &str) -> StoreResult<i32>;
    async fn add_exam(&self, exam: NewExam) -> StoreResult<i32>;
    async fn add_assignment(&self, assignment: NewAssignment) -> StoreResult<i32>;
}
