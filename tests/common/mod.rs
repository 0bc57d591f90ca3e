#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::NaiveDate;
use registrar::config::AppConfig;
use registrar::db::{self, enrollments, subjects};
use registrar::models::{Enrollment, RegisterStudentRequest, Student, Subject};
use registrar::services::{EligibilityPolicy, EnrollmentService};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub async fn setup_test_db() -> SqlitePool {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

/// A pool over a fresh database file, for tests that need several
/// connections writing at once.
pub async fn file_test_db(max_connections: u32) -> (SqlitePool, PathBuf) {
    let path = std::env::temp_dir().join(format!("registrar-{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite://{}", path.display());
    let pool = db::connect(&url, max_connections)
        .await
        .expect("Failed to create file db");
    db::migrate(&pool).await.expect("Failed to run migrations");
    (pool, path)
}

pub async fn remove_file_test_db(pool: SqlitePool, path: PathBuf) {
    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

pub fn test_config(policy: EligibilityPolicy) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        max_connections: 1,
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        jwt_secret: "test-secret-for-integration-tests".to_string(),
        token_ttl_secs: 600,
        prerequisite_policy: policy,
    }
}

pub async fn test_app() -> (Router, SqlitePool) {
    let pool = setup_test_db().await;
    let app = registrar::app(pool.clone(), &test_config(EligibilityPolicy::default()));
    (app, pool)
}

pub async fn subject(pool: &SqlitePool, name: &str, prerequisites: &[i64]) -> Subject {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let subject = subjects::insert_subject(&mut conn, name, "")
        .await
        .expect("Failed to insert subject");
    subjects::replace_prerequisites(&mut conn, subject.id, prerequisites)
        .await
        .expect("Failed to link prerequisites");
    subject
}

pub fn registration(first_name: &str, email: &str, subject_ids: Vec<i64>) -> RegisterStudentRequest {
    RegisterStudentRequest {
        first_name: first_name.to_string(),
        last_name: "Test".to_string(),
        email: email.to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(2002, 3, 14).unwrap(),
        subject_ids,
    }
}

pub async fn student(service: &EnrollmentService, first_name: &str, email: &str) -> Student {
    service
        .register_student(registration(first_name, email, Vec::new()))
        .await
        .expect("Failed to register student")
}

pub async fn all_enrollments(pool: &SqlitePool) -> Vec<Enrollment> {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    enrollments::fetch_enrollments(&mut conn)
        .await
        .expect("Failed to fetch enrollments")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
