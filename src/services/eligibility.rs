use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use crate::db::{enrollments, subjects};
use crate::models::Enrollment;

/// Rule deciding whether a student's history satisfies a subject's
/// direct prerequisites. One policy is chosen per process and applied to
/// every path that creates an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// At least one enrollment, graded or not, in any one prerequisite.
    #[default]
    AnyPrerequisiteEnrolled,
    /// A passing enrollment in every prerequisite.
    AllPrerequisitesPassed,
}

impl EligibilityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            EligibilityPolicy::AnyPrerequisiteEnrolled => "any_enrolled",
            EligibilityPolicy::AllPrerequisitesPassed => "all_passed",
        }
    }

    /// Only direct prerequisites are consulted; cycles are not detected.
    pub fn is_eligible(self, prerequisites: &[i64], history: &[Enrollment]) -> bool {
        if prerequisites.is_empty() {
            return true;
        }

        match self {
            EligibilityPolicy::AnyPrerequisiteEnrolled => history
                .iter()
                .any(|e| prerequisites.contains(&e.subject_id)),
            EligibilityPolicy::AllPrerequisitesPassed => prerequisites.iter().all(|p| {
                history
                    .iter()
                    .any(|e| e.subject_id == *p && e.is_passed())
            }),
        }
    }
}

impl fmt::Display for EligibilityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown prerequisite policy: {0}")]
pub struct UnknownPolicy(String);

impl FromStr for EligibilityPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any_enrolled" | "any_prerequisite_enrolled" => Ok(Self::AnyPrerequisiteEnrolled),
            "all_passed" | "all_prerequisites_passed" => Ok(Self::AllPrerequisitesPassed),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// Looks up the subject's prerequisites and the student's enrollments and
/// applies `policy` to them.
pub async fn is_student_eligible(
    conn: &mut SqliteConnection,
    policy: EligibilityPolicy,
    student_id: i64,
    subject_id: i64,
) -> Result<bool, sqlx::Error> {
    let prerequisites = subjects::fetch_prerequisite_ids(conn, subject_id).await?;
    if prerequisites.is_empty() {
        return Ok(true);
    }
    let history = enrollments::fetch_student_enrollments(conn, student_id).await?;

    Ok(policy.is_eligible(&prerequisites, &history))
}
