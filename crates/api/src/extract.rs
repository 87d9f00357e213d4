//! Request extractors that report malformed input as [`AppError`].
//!
//! The stock axum extractors answer a body, query or path they cannot
//! deserialize with their own status and a plain-text body. These wrappers
//! route the rejection through [`AppError`] instead, so unparsable input is a
//! validation failure with the usual JSON error body.

use axum::extract::{FromRequest, FromRequestParts};

use crate::middleware::error_handling::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
