use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, warn};

use crate::db::{self, enrollments, students, subjects};
use crate::error::{AppError, unique_violation};
use crate::models::{
    Enrollment, GradeSubjectRequest, Grade, NewEnrollmentRequest, RegisterStudentRequest, Student,
    Subject,
};
use crate::services::{EligibilityPolicy, is_student_eligible};

/// Creates enrollments and writes grades. Every operation runs in its own
/// transaction: all checks happen before the first write, and a failure
/// leaves the store as it was.
#[derive(Clone)]
pub struct EnrollmentService {
    db: SqlitePool,
    policy: EligibilityPolicy,
}

impl EnrollmentService {
    pub fn new(db: SqlitePool, policy: EligibilityPolicy) -> Self {
        Self { db, policy }
    }

    /// Creates the student and enrolls them in every requested subject, or
    /// nothing at all.
    pub async fn register_student(&self, req: RegisterStudentRequest) -> Result<Student, AppError> {
        req.validate()?;

        let mut tx = db::begin_write(&self.db).await?;
        let today = Utc::now().date_naive();

        let student = students::insert_student(
            &mut tx,
            req.first_name.trim(),
            req.last_name.trim(),
            req.email.trim(),
            req.date_of_birth,
            today,
        )
        .await
        .map_err(|e| unique_violation(e, "email", "student with this email already exists."))?;

        let admitted = self
            .admit_subjects(&mut tx, student.id, &[], &req.subject_ids)
            .await?;
        for subject in &admitted {
            enrollments::insert_enrollment(&mut tx, student.id, subject.id, today, None)
                .await
                .map_err(|e| already_enrolled(e, "subject_ids", subject))?;
        }

        tx.commit().await?;
        info!(
            "registered student {} with {} enrollment(s)",
            student.id,
            admitted.len()
        );
        Ok(student)
    }

    /// Enrolls an existing student in every listed subject, or none of them.
    pub async fn enroll_student(
        &self,
        student_id: i64,
        subject_ids: &[i64],
    ) -> Result<Vec<Enrollment>, AppError> {
        if subject_ids.is_empty() {
            return Err(AppError::validation(
                "subject_ids",
                "Student ID and Subject IDs are required.",
            ));
        }

        let mut tx = db::begin_write(&self.db).await?;
        students::find_student(&mut tx, student_id)
            .await?
            .ok_or_else(|| AppError::not_found("Student"))?;

        let history = enrollments::fetch_student_enrollments(&mut tx, student_id).await?;
        let admitted = self
            .admit_subjects(&mut tx, student_id, &history, subject_ids)
            .await?;

        let today = Utc::now().date_naive();
        let mut created = Vec::with_capacity(admitted.len());
        for subject in &admitted {
            created.push(
                enrollments::insert_enrollment(&mut tx, student_id, subject.id, today, None)
                    .await
                    .map_err(|e| already_enrolled(e, "subject_ids", subject))?,
            );
        }

        tx.commit().await?;
        info!("enrolled student {} in {} subject(s)", student_id, created.len());
        Ok(created)
    }

    /// Single enrollment, optionally with an initial grade. Subject to the
    /// same eligibility and grade rules as the other write paths.
    pub async fn create_enrollment(&self, req: NewEnrollmentRequest) -> Result<Enrollment, AppError> {
        let grade = match req.grade.as_ref() {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                Grade::from_json(Some(value))
                    .map_err(|e| e.into_app_error("grade"))?
                    .value(),
            ),
        };

        let mut tx = db::begin_write(&self.db).await?;
        students::find_student(&mut tx, req.student)
            .await?
            .ok_or_else(|| {
                AppError::validation("student", format!("Student {} does not exist.", req.student))
            })?;

        let history = enrollments::fetch_student_enrollments(&mut tx, req.student).await?;
        let admitted = self
            .admit_subjects(&mut tx, req.student, &history, &[req.subject])
            .await
            .map_err(|e| match e {
                AppError::Validation { message, .. } => AppError::validation("subject", message),
                other => other,
            })?;

        let subject = admitted
            .into_iter()
            .next()
            .ok_or_else(|| AppError::validation("subject", "Subject does not exist."))?;

        let today = Utc::now().date_naive();
        let enrollment =
            enrollments::insert_enrollment(&mut tx, req.student, subject.id, today, grade)
                .await
                .map_err(|e| already_enrolled(e, "subject", &subject))?;

        tx.commit().await?;
        Ok(enrollment)
    }

    pub async fn update_grade(
        &self,
        enrollment_id: i64,
        grade: Option<&Value>,
    ) -> Result<Enrollment, AppError> {
        let mut conn = self.db.acquire().await?;
        enrollments::find_enrollment(&mut conn, enrollment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment"))?;

        let grade = Grade::from_json(grade).map_err(|e| {
            warn!("rejected grade for enrollment {}: {}", enrollment_id, e);
            e.into_app_error("grade")
        })?;

        let enrollment = enrollments::set_grade(&mut conn, enrollment_id, grade.value())
            .await?
            .ok_or_else(|| AppError::not_found("Enrollment"))?;

        info!("graded enrollment {} with {}", enrollment_id, grade.value());
        Ok(enrollment)
    }

    /// Grades several students in one subject. Every entry is checked before
    /// any grade is written; returns how many entries were applied.
    pub async fn bulk_grade_subject(&self, req: &GradeSubjectRequest) -> Result<usize, AppError> {
        let mut tx = db::begin_write(&self.db).await?;

        subjects::find_subject(&mut tx, req.subject_id)
            .await?
            .ok_or_else(|| AppError::validation("subject_id", "Subject not found."))?;

        let mut seen = HashSet::new();
        let mut planned = Vec::with_capacity(req.grades.len());
        for entry in &req.grades {
            if !seen.insert(entry.student_id) {
                return Err(AppError::validation(
                    "grades",
                    format!("Student with ID {} is listed more than once.", entry.student_id),
                ));
            }

            let grade = Grade::from_json(entry.grade.as_ref()).map_err(|e| {
                AppError::validation(
                    "grades",
                    format!("{} (student with ID {})", e, entry.student_id),
                )
            })?;

            if enrollments::find_enrollment_for(&mut tx, entry.student_id, req.subject_id)
                .await?
                .is_none()
            {
                warn!(
                    "bulk grading subject {}: student {} is not enrolled",
                    req.subject_id, entry.student_id
                );
                return Err(AppError::validation(
                    "grades",
                    format!("Enrollment not found for student with ID {}.", entry.student_id),
                ));
            }

            planned.push((entry.student_id, grade));
        }

        for (student_id, grade) in &planned {
            enrollments::set_grade_for(&mut tx, *student_id, req.subject_id, grade.value()).await?;
        }

        tx.commit().await?;
        info!("graded {} student(s) in subject {}", planned.len(), req.subject_id);
        Ok(planned.len())
    }

    /// Resolves `subject_ids` and checks each one against the student's
    /// enrollments before this operation (`history`). Nothing is written
    /// until every subject is admitted, so subjects earlier in the same list
    /// do not count toward later prerequisites.
    async fn admit_subjects(
        &self,
        conn: &mut SqliteConnection,
        student_id: i64,
        history: &[Enrollment],
        subject_ids: &[i64],
    ) -> Result<Vec<Subject>, AppError> {
        let mut seen = HashSet::new();
        if let Some(id) = subject_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(AppError::validation(
                "subject_ids",
                format!("Subject {} is listed more than once.", id),
            ));
        }

        if let Some(id) = subjects::missing_subject_ids(conn, subject_ids).await?.first() {
            return Err(AppError::validation(
                "subject_ids",
                format!("Subject {} does not exist.", id),
            ));
        }

        let mut admitted = Vec::with_capacity(subject_ids.len());
        for id in subject_ids {
            let Some(subject) = subjects::find_subject(conn, *id).await? else {
                return Err(AppError::validation(
                    "subject_ids",
                    format!("Subject {} does not exist.", id),
                ));
            };

            if history.iter().any(|e| e.subject_id == subject.id) {
                return Err(AppError::validation(
                    "subject_ids",
                    format!("The student is already enrolled in {}.", subject.name),
                ));
            }

            if !is_student_eligible(conn, self.policy, student_id, subject.id).await? {
                warn!(
                    "student {} does not meet prerequisites for subject {} ({})",
                    student_id, subject.id, self.policy
                );
                return Err(AppError::validation(
                    "subject_ids",
                    format!(
                        "The student does not meet the prerequisites for {}.",
                        subject.name
                    ),
                ));
            }

            admitted.push(subject);
        }

        Ok(admitted)
    }
}

fn already_enrolled(err: sqlx::Error, field: &str, subject: &Subject) -> AppError {
    unique_violation(
        err,
        field,
        &format!("The student is already enrolled in {}.", subject.name),
    )
}
