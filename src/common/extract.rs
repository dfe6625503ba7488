// src/common/extract.rs

// Json/Path/Query wrappers whose rejections go through AppError, so malformed
// bodies get the same { success: false, message } envelope as everything else.

use axum::extract::{FromRequest, FromRequestParts};

use crate::common::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
