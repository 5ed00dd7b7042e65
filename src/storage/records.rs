//! SQLite-backed ERP record store. Implements the per-student read contracts and
//! offers write helpers for seeding.

use crate::error::Result;
use crate::records::{
    self, AcademicRecord, FeeSummary, RecordSource, ResultStatus, SemesterSummary, Student,
    StudentId, SubjectAttendance, FAILING_GRADE,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        roll_no TEXT NOT NULL,
        email TEXT NOT NULL,
        created_seq INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS academic_records (
        student_id TEXT NOT NULL,
        semester_no INTEGER NOT NULL,
        subject TEXT NOT NULL,
        grade TEXT NOT NULL,
        grade_point REAL NOT NULL,
        credits_earned REAL NOT NULL,
        result_status TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_academic_student ON academic_records(student_id, semester_no);
    CREATE TABLE IF NOT EXISTS attendance (
        student_id TEXT NOT NULL,
        semester_no INTEGER NOT NULL,
        subject TEXT NOT NULL,
        total_classes INTEGER NOT NULL,
        present_classes INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance(student_id);
    CREATE TABLE IF NOT EXISTS fees (
        student_id TEXT NOT NULL,
        semester_no INTEGER NOT NULL,
        total_amount REAL NOT NULL,
        paid_amount REAL NOT NULL,
        pending_amount REAL NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_fees_student ON fees(student_id);
"#;

pub struct RecordStore {
    conn: Mutex<Connection>,
}

impl RecordStore {
    /// Open or create DB at path.
    pub fn open(path: &Path) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // a panic while holding the lock leaves the connection itself usable
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert_student(&self, student: &Student) -> Result<()> {
        self.conn().execute(
            "INSERT INTO students (id, name, roll_no, email, created_seq)
             VALUES (?1, ?2, ?3, ?4, (SELECT COALESCE(MAX(created_seq), 0) + 1 FROM students))
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name, roll_no = excluded.roll_no, email = excluded.email",
            params![
                student.id.as_str(),
                student.name,
                student.roll_no,
                student.email
            ],
        )?;
        Ok(())
    }

    pub fn insert_academic(
        &self,
        student_id: &StudentId,
        semester_no: u32,
        record: &AcademicRecord,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT INTO academic_records
             (student_id, semester_no, subject, grade, grade_point, credits_earned, result_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                student_id.as_str(),
                semester_no,
                record.subject,
                record.grade,
                record.grade_point,
                record.credits_earned,
                record.result_status.as_str()
            ],
        )?;
        Ok(())
    }

    pub fn insert_attendance(
        &self,
        student_id: &StudentId,
        semester_no: u32,
        subject: &str,
        total_classes: u32,
        present_classes: u32,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT INTO attendance (student_id, semester_no, subject, total_classes, present_classes)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![student_id.as_str(), semester_no, subject, total_classes, present_classes],
        )?;
        Ok(())
    }

    /// Bill one period. Pending is derived from total and paid, never negative.
    pub fn insert_fee(
        &self,
        student_id: &StudentId,
        semester_no: u32,
        total_amount: f64,
        paid_amount: f64,
    ) -> Result<()> {
        let pending = (total_amount - paid_amount).max(0.0);
        self.conn().execute(
            "INSERT INTO fees (student_id, semester_no, total_amount, paid_amount, pending_amount)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![student_id.as_str(), semester_no, total_amount, paid_amount, pending],
        )?;
        Ok(())
    }

    fn academic_records(&self, id: &StudentId) -> Result<Vec<(u32, AcademicRecord)>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT semester_no, subject, grade, grade_point, credits_earned, result_status
             FROM academic_records WHERE student_id = ?1
             ORDER BY semester_no, rowid",
        )?;
        let rows = stmt.query_map(params![id.as_str()], |row| {
            let status: String = row.get(5)?;
            Ok((
                row.get::<_, u32>(0)?,
                AcademicRecord {
                    subject: row.get(1)?,
                    grade: row.get(2)?,
                    grade_point: row.get(3)?,
                    credits_earned: row.get(4)?,
                    result_status: ResultStatus::from_db(&status),
                },
            ))
        })?;
        let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(out)
    }
}

fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn to_student((id, name, roll_no, email): (String, String, String, String)) -> Result<Student> {
    Ok(Student {
        id: StudentId::parse(&id)?,
        name,
        roll_no,
        email,
    })
}

impl RecordSource for RecordStore {
    fn students(&self) -> Result<Vec<Student>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, name, roll_no, email FROM students ORDER BY created_seq")?;
        let rows = stmt
            .query_map([], student_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // a malformed id must not hide every other student from a batch
        let students = rows
            .into_iter()
            .filter_map(|row| {
                let raw_id = row.0.clone();
                match to_student(row) {
                    Ok(student) => Some(student),
                    Err(e) => {
                        warn!(raw_id = %raw_id, error = %e, "student row skipped");
                        None
                    }
                }
            })
            .collect();
        Ok(students)
    }

    fn student(&self, id: &StudentId) -> Result<Option<Student>> {
        let row = self
            .conn()
            .query_row(
                "SELECT id, name, roll_no, email FROM students WHERE id = ?1",
                params![id.as_str()],
                student_from_row,
            )
            .optional()?;
        row.map(to_student).transpose()
    }

    fn academic_summary(&self, id: &StudentId) -> Result<Vec<SemesterSummary>> {
        let mut out: Vec<SemesterSummary> = Vec::new();
        for (semester_no, record) in self.academic_records(id)? {
            if let Some(last) = out.last_mut().filter(|l| l.semester_no == semester_no) {
                last.subjects.push(record);
            } else {
                out.push(SemesterSummary {
                    semester_no,
                    semester_gpa: 0.0,
                    total_credits: 0.0,
                    subjects: vec![record],
                });
            }
        }
        for sem in &mut out {
            let n = sem.subjects.len() as f64;
            sem.semester_gpa = sem.subjects.iter().map(|s| s.grade_point).sum::<f64>() / n;
            sem.total_credits = sem.subjects.iter().map(|s| s.credits_earned).sum();
        }
        Ok(out)
    }

    fn cumulative_gpa(&self, id: &StudentId) -> Result<f64> {
        let rows = self.academic_records(id)?;
        Ok(records::cumulative_gpa(rows.iter().map(|(_, r)| r)))
    }

    fn attendance_summary(&self, id: &StudentId) -> Result<Vec<SubjectAttendance>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT subject, total_classes, present_classes FROM attendance
             WHERE student_id = ?1 ORDER BY semester_no, subject",
        )?;
        let rows = stmt.query_map(params![id.as_str()], |row| {
            Ok(SubjectAttendance::new(
                row.get::<_, String>(0)?,
                row.get(1)?,
                row.get(2)?,
            ))
        })?;
        let out = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(out)
    }

    fn backlog_count(&self, id: &StudentId) -> Result<u32> {
        let n: u32 = self.conn().query_row(
            "SELECT COUNT(*) FROM academic_records WHERE student_id = ?1 AND grade = ?2",
            params![id.as_str(), FAILING_GRADE],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    fn fee_summary(&self, id: &StudentId) -> Result<FeeSummary> {
        let summary = self.conn().query_row(
            "SELECT COALESCE(SUM(total_amount), 0), COALESCE(SUM(paid_amount), 0),
                    COALESCE(SUM(pending_amount), 0)
             FROM fees WHERE student_id = ?1",
            params![id.as_str()],
            |row| {
                Ok(FeeSummary {
                    total_fees: row.get(0)?,
                    total_paid: row.get(1)?,
                    total_pending: row.get(2)?,
                })
            },
        )?;
        Ok(summary)
    }
}
