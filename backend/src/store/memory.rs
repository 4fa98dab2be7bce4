use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, Utc};

use super::{DeletedRows, PortalStore, StoreError, StoreResult};
use crate::models::{
    Assignment, AttendanceRecord, Exam, ExamResult, NewAssignment, NewAttendance, NewExam,
    NewPerformance, NewResult, NewStudent, Notice, PerformanceNote, Student, StudentUpdate,
    Teacher,
};

/// One counter per table, like a Postgres `SERIAL` column.
#[derive(Debug, Default)]
struct Sequences {
    student: i32,
    teacher: i32,
    result: i32,
    attendance: i32,
    performance: i32,
    notice: i32,
    exam: i32,
    assignment: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

#[derive(Debug, Default)]
struct Tables {
    seq: Sequences,
    students: Vec<Student>,
    teachers: Vec<Teacher>,
    results: Vec<ExamResult>,
    attendance: Vec<AttendanceRecord>,
    performance: Vec<PerformanceNote>,
    notices: Vec<Notice>,
    exams: Vec<Exam>,
    assignments: Vec<Assignment>,
}

impl Tables {
    fn require_student(&self, id: i32) -> StoreResult<()> {
        if self.students.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }
}

/// Per-table row counts, for asserting on what a write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCounts {
    pub students: usize,
    pub results: usize,
    pub attendance: usize,
    pub performance: usize,
}

/// `PortalStore` kept entirely in process memory. Every operation runs under
/// one lock, so a delete is observed either completely or not at all.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_teacher(&self, name: &str, email: &str, password_hash: &str) -> i32 {
        let mut tables = self.tables();
        let id = next(&mut tables.seq.teacher);
        tables.teachers.push(Teacher {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        });
        id
    }

    pub fn row_counts(&self) -> RowCounts {
        let tables = self.tables();
        RowCounts {
            students: tables.students.len(),
            results: tables.results.len(),
            attendance: tables.attendance.len(),
            performance: tables.performance.len(),
        }
    }
}

fn newest<T: Clone>(rows: &[T], limit: i64, key: impl Fn(&T) -> (i64, i32)) -> Vec<T> {
    let mut rows = rows.to_vec();
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows.truncate(usize::try_from(limit).unwrap_or(0));
    rows
}

#[async_trait(?Send)]
impl PortalStore for MemoryStore {
    async fn find_teacher_by_email(&self, email: &str) -> StoreResult<Option<Teacher>> {
        Ok(self.tables().teachers.iter().find(|t| t.email == email).cloned())
    }

    async fn find_student_by_roll(&self, roll_number: i32) -> StoreResult<Option<Student>> {
        Ok(self
            .tables()
            .students
            .iter()
            .find(|s| s.roll_number == roll_number)
            .cloned())
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let mut students = self.tables().students.clone();
        students.sort_by_key(|s| s.id);
        Ok(students)
    }

    async fn get_student(&self, id: i32) -> StoreResult<Option<Student>> {
        Ok(self.tables().students.iter().find(|s| s.id == id).cloned())
    }

    async fn count_students(&self) -> StoreResult<i64> {
        Ok(self.tables().students.len() as i64)
    }

    async fn recent_students(&self, limit: i64) -> StoreResult<Vec<Student>> {
        Ok(newest(&self.tables().students, limit, |s| (0, s.id)))
    }

    async fn student_results(&self, student_id: i32) -> StoreResult<Vec<ExamResult>> {
        Ok(self
            .tables()
            .results
            .iter()
            .filter(|r| r.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn student_attendance(&self, student_id: i32) -> StoreResult<Vec<AttendanceRecord>> {
        let mut records: Vec<_> = self
            .tables()
            .attendance
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by_key(|a| (a.date, a.id));
        Ok(records)
    }

    async fn student_performance(&self, student_id: i32) -> StoreResult<Option<PerformanceNote>> {
        Ok(self
            .tables()
            .performance
            .iter()
            .filter(|p| p.student_id == student_id)
            .max_by_key(|p| p.id)
            .cloned())
    }

    async fn recent_notices(&self, limit: i64) -> StoreResult<Vec<Notice>> {
        Ok(newest(&self.tables().notices, limit, |n| {
            (n.created_at.timestamp_micros(), n.id)
        }))
    }

    async fn recent_exams(&self, limit: i64) -> StoreResult<Vec<Exam>> {
        Ok(newest(&self.tables().exams, limit, |e| {
            (i64::from(e.exam_date.num_days_from_ce()), e.id)
        }))
    }

    async fn recent_assignments(&self, limit: i64) -> StoreResult<Vec<Assignment>> {
        Ok(newest(&self.tables().assignments, limit, |a| {
            (i64::from(a.due_date.num_days_from_ce()), a.id)
        }))
    }

    async fn create_student(&self, student: NewStudent) -> StoreResult<i32> {
        let mut tables = self.tables();
        if tables.students.iter().any(|s| s.roll_number == student.roll_number) {
            return Err(StoreError::Conflict("student_roll_number_key".to_string()));
        }
        if tables
            .students
            .iter()
            .any(|s| s.registration_number == student.registration_number)
        {
            return Err(StoreError::Conflict(
                "student_registration_number_key".to_string(),
            ));
        }

        let id = next(&mut tables.seq.student);
        tables.students.push(Student {
            id,
            name: student.name,
            roll_number: student.roll_number,
            registration_number: student.registration_number,
            department: student.department,
            semester: student.semester,
            session: student.session,
            phone: student.phone,
            password_hash: student.password_hash,
        });
        Ok(id)
    }

    async fn update_student(&self, id: i32, update: StudentUpdate) -> StoreResult<()> {
        let mut tables = self.tables();
        tables.require_student(id)?;
        if tables
            .students
            .iter()
            .any(|s| s.id != id && s.roll_number == update.roll_number)
        {
            return Err(StoreError::Conflict("student_roll_number_key".to_string()));
        }

        let student = tables
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound)?;
        student.name = update.name;
        student.roll_number = update.roll_number;
        student.department = update.department;
        Ok(())
    }

    async fn delete_student(&self, id: i32) -> StoreResult<DeletedRows> {
        let mut tables = self.tables();
        tables.require_student(id)?;

        let before = (
            tables.results.len(),
            tables.attendance.len(),
            tables.performance.len(),
        );
        tables.results.retain(|r| r.student_id != id);
        tables.attendance.retain(|a| a.student_id != id);
        tables.performance.retain(|p| p.student_id != id);
        tables.students.retain(|s| s.id != id);

        Ok(DeletedRows {
            results: (before.0 - tables.results.len()) as u64,
            attendance: (before.1 - tables.attendance.len()) as u64,
            performance: (before.2 - tables.performance.len()) as u64,
        })
    }

    async fn add_result(&self, result: NewResult) -> StoreResult<i32> {
        let mut tables = self.tables();
        tables.require_student(result.student_id)?;
        let id = next(&mut tables.seq.result);
        tables.results.push(ExamResult {
            id,
            student_id: result.student_id,
            subject: result.subject,
            marks: result.marks,
            grade: result.grade,
            exam_type: result.exam_type,
        });
        Ok(id)
    }

    async fn add_attendance(&self, record: NewAttendance) -> StoreResult<i32> {
        let mut tables = self.tables();
        tables.require_student(record.student_id)?;
        let id = next(&mut tables.seq.attendance);
        tables.attendance.push(AttendanceRecord {
            id,
            student_id: record.student_id,
            date: record.date,
            status: record.status.as_str().to_string(),
        });
        Ok(id)
    }

    async fn add_performance(&self, note: NewPerformance) -> StoreResult<i32> {
        let mut tables = self.tables();
        tables.require_student(note.student_id)?;
        let id = next(&mut tables.seq.performance);
        tables.performance.push(PerformanceNote {
            id,
            student_id: note.student_id,
            remarks: note.remarks,
            rating: note.rating,
        });
        Ok(id)
    }

    async fn add_notice(&self, title: &str, body: &str) -> StoreResult<i32> {
        let mut tables = self.tables();
        let id = next(&mut tables.seq.notice);
        tables.notices.push(Notice {
            id,
            title: title.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn add_exam(&self, exam: NewExam) -> StoreResult<i32> {
        let mut tables = self.tables();
        let id = next(&mut tables.seq.exam);
        tables.exams.push(Exam {
            id,
            subject: exam.subject,
            exam_date: exam.exam_date,
            details: exam.details,
        });
        Ok(id)
    }

    async fn add_assignment(&self, assignment: NewAssignment) -> StoreResult<i32> {
        let mut tables = self.tables();
        let id = next(&mut tables.seq.assignment);
        tables.assignments.push(Assignment {
            id,
            title: assignment.title,
            subject: assignment.subject,
            due_date: assignment.due_date,
            details: assignment.details,
        });
        Ok(id)
    }
}
