use axum::Json;
use axum::extract::FromRequest;

use crate::error::AppError;

/// `Json` whose rejections answer through `AppError` as 400s.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub(super) struct AppJson<T>(pub T);
