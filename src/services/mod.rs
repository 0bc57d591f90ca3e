pub mod catalog;
pub mod eligibility;
pub mod enrollment_service;
pub mod roster;
pub mod statistics;

pub use eligibility::{EligibilityPolicy, is_student_eligible};
pub use enrollment_service::EnrollmentService;
pub use roster::{Gradebook, GradebookEntry, Roster};
pub use statistics::{StudentReport, StudentStats};
