mod common;

use registrar::db::{enrollments, professors, students, subjects};
use registrar::error::AppError;
use registrar::models::{GradeEntry, GradeSubjectRequest, NewEnrollmentRequest};
use registrar::services::{EligibilityPolicy, EnrollmentService, is_student_eligible, statistics};
use serde_json::json;

use common::{
    all_enrollments, file_test_db, registration, remove_file_test_db, setup_test_db, student,
    subject,
};

fn validation_message(err: &AppError) -> (&str, &str) {
    match err {
        AppError::Validation { field, message } => (field.as_str(), message.as_str()),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_calculus_prerequisite_scenario() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::AnyPrerequisiteEnrolled);

    let calc1 = subject(&pool, "Calculus I", &[]).await;
    let calc2 = subject(&pool, "Calculus II", &[calc1.id]).await;

    let err = service
        .register_student(registration("Bea", "bea@uni.edu", vec![calc2.id]))
        .await
        .unwrap_err();
    let (field, message) = validation_message(&err);
    assert_eq!(field, "subject_ids");
    assert!(message.contains("Calculus II"));

    // The failed registration left nothing behind.
    let mut conn = pool.acquire().await.unwrap();
    assert!(students::fetch_students(&mut conn).await.unwrap().is_empty());
    drop(conn);

    let ana = student(&service, "Ana", "ana@uni.edu").await;
    let err = service.enroll_student(ana.id, &[calc2.id]).await.unwrap_err();
    assert!(validation_message(&err).1.contains("Calculus II"));

    service
        .create_enrollment(NewEnrollmentRequest {
            student: ana.id,
            subject: calc1.id,
            grade: None,
        })
        .await
        .expect("Calculus I has no prerequisites");

    let created = service
        .enroll_student(ana.id, &[calc2.id])
        .await
        .expect("an enrollment in Calculus I satisfies the prerequisite");
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].subject_id, calc2.id);
    assert_eq!(created[0].grade, None);
}

#[tokio::test]
async fn test_registration_enrolls_in_open_subjects() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());

    let algebra = subject(&pool, "Algebra", &[]).await;
    let history = subject(&pool, "History", &[]).await;

    let ana = service
        .register_student(registration("Ana", "ana@uni.edu", vec![algebra.id, history.id]))
        .await
        .expect("Failed to register student");

    let rows = all_enrollments(&pool).await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|e| e.student_id == ana.id && e.grade.is_none()));
    assert!(rows.iter().all(|e| e.enrollment_date == ana.enrollment_date));
}

#[tokio::test]
async fn test_enroll_is_all_or_nothing() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());

    let algebra = subject(&pool, "Algebra", &[]).await;
    let calc1 = subject(&pool, "Calculus I", &[]).await;
    let calc2 = subject(&pool, "Calculus II", &[calc1.id]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;

    let err = service
        .enroll_student(ana.id, &[algebra.id, calc2.id])
        .await
        .unwrap_err();
    assert!(validation_message(&err).1.contains("Calculus II"));
    assert!(all_enrollments(&pool).await.is_empty());

    // Prerequisites admitted in the same request do not count.
    let err = service
        .enroll_student(ana.id, &[calc1.id, calc2.id])
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(all_enrollments(&pool).await.is_empty());
}

#[tokio::test]
async fn test_enroll_rejects_unknown_student_and_subjects() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;

    let err = service.enroll_student(404, &[algebra.id]).await.unwrap_err();
    assert!(err.is_not_found());

    let ana = student(&service, "Ana", "ana@uni.edu").await;
    let err = service.enroll_student(ana.id, &[algebra.id, 999]).await.unwrap_err();
    assert!(validation_message(&err).1.contains("999"));

    let err = service.enroll_student(ana.id, &[]).await.unwrap_err();
    assert!(err.is_validation());
    assert!(all_enrollments(&pool).await.is_empty());
}

#[tokio::test]
async fn test_duplicate_enrollments_are_rejected() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;

    let err = service
        .enroll_student(ana.id, &[algebra.id, algebra.id])
        .await
        .unwrap_err();
    assert!(validation_message(&err).1.contains("more than once"));

    service.enroll_student(ana.id, &[algebra.id]).await.unwrap();
    let err = service.enroll_student(ana.id, &[algebra.id]).await.unwrap_err();
    assert!(validation_message(&err).1.contains("already enrolled in Algebra"));
    assert_eq!(all_enrollments(&pool).await.len(), 1);
}

#[tokio::test]
async fn test_all_passed_policy_requires_passing_grades() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::AllPrerequisitesPassed);

    let calc1 = subject(&pool, "Calculus I", &[]).await;
    let linear = subject(&pool, "Linear Algebra", &[]).await;
    let calc2 = subject(&pool, "Calculus II", &[calc1.id, linear.id]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;

    let taken = service.enroll_student(ana.id, &[calc1.id, linear.id]).await.unwrap();
    assert!(service.enroll_student(ana.id, &[calc2.id]).await.is_err());

    service.update_grade(taken[0].id, Some(&json!(3.0))).await.unwrap();
    service.update_grade(taken[1].id, Some(&json!(2.5))).await.unwrap();
    assert!(service.enroll_student(ana.id, &[calc2.id]).await.is_err());

    service.update_grade(taken[1].id, Some(&json!(3.4))).await.unwrap();
    service
        .enroll_student(ana.id, &[calc2.id])
        .await
        .expect("both prerequisites passed");
}

#[tokio::test]
async fn test_eligibility_lookup() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let calc1 = subject(&pool, "Calculus I", &[]).await;
    let calc2 = subject(&pool, "Calculus II", &[calc1.id]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;

    let mut conn = pool.acquire().await.unwrap();
    let policy = EligibilityPolicy::default();
    assert!(is_student_eligible(&mut conn, policy, ana.id, calc1.id).await.unwrap());
    assert!(!is_student_eligible(&mut conn, policy, ana.id, calc2.id).await.unwrap());
    drop(conn);

    service.enroll_student(ana.id, &[calc1.id]).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    assert!(is_student_eligible(&mut conn, policy, ana.id, calc2.id).await.unwrap());
}

#[tokio::test]
async fn test_update_grade_bounds() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;
    let enrollment = service.enroll_student(ana.id, &[algebra.id]).await.unwrap().remove(0);

    for rejected in [json!(-0.1), json!(5.1), json!("abc"), json!(true)] {
        let err = service
            .update_grade(enrollment.id, Some(&rejected))
            .await
            .unwrap_err();
        assert_eq!(validation_message(&err).0, "grade");
    }
    let err = service.update_grade(enrollment.id, None).await.unwrap_err();
    assert_eq!(validation_message(&err).1, "Grade is required.");

    for accepted in [0.0, 5.0] {
        let updated = service
            .update_grade(enrollment.id, Some(&json!(accepted)))
            .await
            .unwrap();
        assert_eq!(updated.grade, Some(accepted));
    }

    let updated = service.update_grade(enrollment.id, Some(&json!("3.5"))).await.unwrap();
    assert_eq!(updated.grade, Some(3.5));
    assert!(updated.is_passed());

    let err = service.update_grade(9999, Some(&json!(4.0))).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bulk_grading_is_atomic() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;
    let luis = student(&service, "Luis", "luis@uni.edu").await;
    let eva = student(&service, "Eva", "eva@uni.edu").await;
    service.enroll_student(ana.id, &[algebra.id]).await.unwrap();
    service.enroll_student(luis.id, &[algebra.id]).await.unwrap();

    let request = |entries: Vec<(i64, serde_json::Value)>| GradeSubjectRequest {
        subject_id: algebra.id,
        grades: entries
            .into_iter()
            .map(|(student_id, grade)| GradeEntry {
                student_id,
                grade: Some(grade),
            })
            .collect(),
    };

    let err = service
        .bulk_grade_subject(&request(vec![(ana.id, json!(4.0)), (eva.id, json!(3.0))]))
        .await
        .unwrap_err();
    let (field, message) = validation_message(&err);
    assert_eq!(field, "grades");
    assert!(message.contains(&eva.id.to_string()));
    assert!(all_enrollments(&pool).await.iter().all(|e| e.grade.is_none()));

    let err = service
        .bulk_grade_subject(&request(vec![(ana.id, json!(4.0)), (luis.id, json!(5.5))]))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert!(all_enrollments(&pool).await.iter().all(|e| e.grade.is_none()));

    let err = service
        .bulk_grade_subject(&request(vec![(ana.id, json!(4.0)), (ana.id, json!(2.0))]))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let updated = service
        .bulk_grade_subject(&request(vec![(ana.id, json!(4.0)), (luis.id, json!(2.0))]))
        .await
        .unwrap();
    assert_eq!(updated, 2);
    let mut grades: Vec<_> = all_enrollments(&pool)
        .await
        .into_iter()
        .map(|e| (e.student_id, e.grade))
        .collect();
    grades.sort_by_key(|(id, _)| *id);
    assert_eq!(grades, vec![(ana.id, Some(4.0)), (luis.id, Some(2.0))]);
}

#[tokio::test]
async fn test_bulk_grading_unknown_subject() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());

    let err = service
        .bulk_grade_subject(&GradeSubjectRequest {
            subject_id: 77,
            grades: Vec::new(),
        })
        .await
        .unwrap_err();
    assert_eq!(validation_message(&err).0, "subject_id");
}

#[tokio::test]
async fn test_student_report() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;
    let geometry = subject(&pool, "Geometry", &[]).await;
    let physics = subject(&pool, "Physics", &[]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;

    let report = statistics::student_report(&pool, ana.id).await.unwrap();
    assert_eq!(report.stats.average_grade, None);
    assert!(report.stats.enrollments.is_empty());

    let taken = service
        .enroll_student(ana.id, &[algebra.id, geometry.id, physics.id])
        .await
        .unwrap();
    service.update_grade(taken[0].id, Some(&json!(3.0))).await.unwrap();
    service.update_grade(taken[2].id, Some(&json!(5.0))).await.unwrap();

    let report = statistics::student_report(&pool, ana.id).await.unwrap();
    assert_eq!(report.stats.average_grade, Some(4.0));
    assert_eq!(report.stats.approved_subjects, vec![algebra.clone(), physics.clone()]);
    assert!(report.stats.failed_subjects.is_empty());
    assert_eq!(report.stats.in_progress_subjects, vec![geometry.clone()]);

    service.update_grade(taken[1].id, Some(&json!(1.0))).await.unwrap();
    let report = statistics::student_report(&pool, ana.id).await.unwrap();
    assert_eq!(report.stats.failed_subjects, vec![geometry]);
    assert_eq!(report.stats.average_grade, Some(3.0));

    let err = statistics::student_report(&pool, 4040).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_deletes_cascade_to_enrollments_only() {
    let pool = setup_test_db().await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let algebra = subject(&pool, "Algebra", &[]).await;
    let geometry = subject(&pool, "Geometry", &[]).await;
    let ana = student(&service, "Ana", "ana@uni.edu").await;
    let luis = student(&service, "Luis", "luis@uni.edu").await;
    service.enroll_student(ana.id, &[algebra.id, geometry.id]).await.unwrap();
    service.enroll_student(luis.id, &[algebra.id]).await.unwrap();

    let mut conn = pool.acquire().await.unwrap();
    let professor = professors::insert_professor(&mut conn, "Ada", "Lovelace", "ada@uni.edu", "Math")
        .await
        .unwrap();
    professors::replace_professor_subjects(&mut conn, professor.id, &[algebra.id, geometry.id])
        .await
        .unwrap();

    assert!(professors::delete_professor(&mut conn, professor.id).await.unwrap());
    assert_eq!(subjects::fetch_subjects(&mut conn).await.unwrap().len(), 2);
    assert_eq!(enrollments::fetch_enrollments(&mut conn).await.unwrap().len(), 3);

    assert!(subjects::delete_subject(&mut conn, algebra.id).await.unwrap());
    let remaining = enrollments::fetch_enrollments(&mut conn).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].subject_id, geometry.id);

    assert!(students::delete_student(&mut conn, ana.id).await.unwrap());
    assert!(enrollments::fetch_enrollments(&mut conn).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrolls_of_one_student_never_hit_lock_errors() {
    let (pool, path) = file_test_db(5).await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let mut subject_ids = Vec::new();
    for name in ["Algebra", "Geometry", "Physics", "Chemistry"] {
        subject_ids.push(subject(&pool, name, &[]).await.id);
    }
    let ana_id = student(&service, "Ana", "ana@uni.edu").await.id;

    let mut tasks = Vec::new();
    for _ in 0..40 {
        let service = service.clone();
        let subject_ids = subject_ids.clone();
        tasks.push(tokio::spawn(async move {
            service.enroll_student(ana_id, &subject_ids).await
        }));
    }

    let mut succeeded = 0;
    for task in tasks {
        match task.await.expect("enroll task panicked") {
            Ok(created) => {
                assert_eq!(created.len(), 4);
                succeeded += 1;
            }
            Err(err) => {
                let (field, message) = validation_message(&err);
                assert_eq!(field, "subject_ids");
                assert!(message.contains("already enrolled"), "{message}");
            }
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(all_enrollments(&pool).await.len(), 4);
    remove_file_test_db(pool, path).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_enrolls_of_different_students_all_succeed() {
    let (pool, path) = file_test_db(5).await;
    let service = EnrollmentService::new(pool.clone(), EligibilityPolicy::default());
    let calc1 = subject(&pool, "Calculus I", &[]).await.id;
    let calc2 = subject(&pool, "Calculus II", &[calc1]).await.id;

    let mut tasks = Vec::new();
    for i in 0..20 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            let student = service
                .register_student(registration("Student", &format!("s{i}@uni.edu"), vec![calc1]))
                .await?;
            service.enroll_student(student.id, &[calc2]).await
        }));
    }

    for task in tasks {
        let created = task
            .await
            .expect("enroll task panicked")
            .expect("every student is eligible for Calculus II");
        assert_eq!(created.len(), 1);
    }

    assert_eq!(all_enrollments(&pool).await.len(), 40);
    remove_file_test_db(pool, path).await;
}
