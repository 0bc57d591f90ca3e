pub mod enrollment;
pub mod grade;
pub mod professor;
pub mod student;
pub mod subject;
pub mod user;

pub use enrollment::{
    EnrollRequest, Enrollment, EnrollmentView, GradeEntry, GradeSubjectRequest,
    NewEnrollmentRequest, UpdateGradeRequest,
};
pub use grade::{EnrollmentStatus, Grade, GradeError, MAX_GRADE, MIN_GRADE, PASS_THRESHOLD};
pub use professor::{Professor, ProfessorDetail, ProfessorRequest};
pub use student::{RegisterStudentRequest, Student, StudentSummary, UpdateStudentRequest};
pub use subject::{Subject, SubjectDetail, SubjectRequest};
pub use user::{CreateUserRequest, TokenRequest, TokenResponse, User};

use crate::error::AppError;

pub(crate) fn require_text(field: &str, value: &str, max_len: usize) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(field, "This field may not be blank."));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::validation(
            field,
            format!("Ensure this field has no more than {} characters.", max_len),
        ));
    }
    Ok(())
}

pub(crate) fn require_email(field: &str, value: &str) -> Result<(), AppError> {
    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(field, "Enter a valid email address."))
    }
}
