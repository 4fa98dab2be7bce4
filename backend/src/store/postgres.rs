use async_trait::async_trait;
use log::{debug, error};
use sqlx::PgPool;

use super::{DeletedRows, PortalStore, StoreError, StoreResult};
use crate::models::{
    Assignment, AttendanceRecord, Exam, ExamResult, NewAssignment, NewAttendance, NewExam,
    NewPerformance, NewResult, NewStudent, Notice, PerformanceNote, Student, StudentUpdate,
    Teacher,
};

const STUDENT_COLUMNS: &str = "id, name, roll_number, registration_number, department, semester, \
     session, phone, password_hash";

/// `PortalStore` backed by a process-wide Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait(?Send)]
impl PortalStore for PgStore {
    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<Teacher>> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT id, name, email, password_hash FROM teachers WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(teacher)
    }

    async fn find_student_by_roll(&self, roll_number: i32) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student WHERE roll_number = $1",
            STUDENT_COLUMNS
        ))
        .bind(roll_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student ORDER BY id",
            STUDENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn get_student(&self, id: i32) -> StoreResult<Option<Student>> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student WHERE id = $1",
            STUDENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(student)
    }

    async fn count_students(&self) -> StoreResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM student")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn recent_students(&self, limit: i64) -> StoreResult<Vec<Student>> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {} FROM student ORDER BY id DESC LIMIT $1",
            STUDENT_COLUMNS
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    async fn student_results(&self, student_id: i32) -> StoreResult<Vec<ExamResult>> {
        let results = sqlx::query_as::<_, ExamResult>(
            "SELECT id, student_id, subject, marks, grade, exam_type
             FROM results WHERE student_id = $1 ORDER BY id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(results)
    }

    async fn student_attendance(&self, student_id: i32) -> StoreResult<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT id, student_id, date, status
             FROM attendance WHERE student_id = $1 ORDER BY date, id",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn student_performance(&self, student_id: i32) -> StoreResult<Option<PerformanceNote>> {
        let note = sqlx::query_as::<_, PerformanceNote>(
            "SELECT id, student_id, remarks, rating
             FROM performance WHERE student_id = $1 ORDER BY id DESC LIMIT 1",
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn recent_notices(&self, limit: i64) -> StoreResult<Vec<Notice>> {
        let notices = sqlx::query_as::<_, Notice>(
            "SELECT id, title, body, created_at FROM notices
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(notices)
    }

    async fn recent_exams(&self, limit: i64) -> StoreResult<Vec<Exam>> {
        let exams = sqlx::query_as::<_, Exam>(
            "SELECT id, subject, exam_date, details FROM exams
             ORDER BY exam_date DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(exams)
    }

    async fn recent_assignments(&self, limit: i64) -> StoreResult<Vec<Assignment>> {
        let assignments = sqlx::query_as::<_, Assignment>(
            "SELECT id, title, subject, due_date, details FROM assignments
             ORDER BY due_date DESC, id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    async fn create_student(&self, student: NewStudent) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO student
                (name, roll_number, registration_number, department, semester, session, phone, password_hash)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&student.name)
        .bind(student.roll_number)
        .bind(student.registration_number)
        .bind(&student.department)
        .bind(&student.semester)
        .bind(&student.session)
        .bind(&student.phone)
        .bind(&student.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_student(&self, id: i32, update: StudentUpdate) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE student SET name = $1, roll_number = $2, department = $3 WHERE id = $4",
        )
        .bind(&update.name)
        .bind(update.roll_number)
        .bind(&update.department)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn delete_student(&self, id: i32) -> StoreResult<DeletedRows> {
        let mut tx = self.pool.begin().await?;

        // Children first; an early return through `?` drops `tx`, which rolls it back.
        let results = sqlx::query("DELETE FROM results WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let attendance = sqlx::query("DELETE FROM attendance WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let performance = sqlx::query("DELETE FROM performance WHERE student_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let students = sqlx::query("DELETE FROM student WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if students == 0 {
            if let Err(e) = tx.rollback().await {
                error!("Failed to roll back delete of missing student {}: {}", id, e);
            }
            return Err(StoreError::NotFound);
        }

        tx.commit().await?;

        debug!(
            "Deleted student {} ({} results, {} attendance, {} performance rows)",
            id, results, attendance, performance
        );

        Ok(DeletedRows {
            results,
            attendance,
            performance,
        })
    }

    async fn add_result(&self, result: NewResult) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO results (student_id, subject, marks, grade, exam_type)
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(result.student_id)
        .bind(&result.subject)
        .bind(result.marks)
        .bind(&result.grade)
        .bind(&result.exam_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_attendance(&self, record: NewAttendance) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO attendance (student_id, date, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(record.student_id)
        .bind(record.date)
        .bind(record.status.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_performance(&self, note: NewPerformance) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO performance (student_id, remarks, rating) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(note.student_id)
        .bind(&note.remarks)
        .bind(note.rating)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_notice(&self, title: &str, body: &str) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO notices (title, body) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_exam(&self, exam: NewExam) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO exams (subject, exam_date, details) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&exam.subject)
        .bind(exam.exam_date)
        .bind(&exam.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> StoreResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO assignments (title, subject, due_date, details)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(&assignment.title)
        .bind(&assignment.subject)
        .bind(assignment.due_date)
        .bind(&assignment.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }
}
