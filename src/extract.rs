//! Request extractors whose rejections render as `{"detail": ...}` bodies.
//!
//! Drop-in replacements for `Json`, `Query` and `Path`: a malformed body,
//! query string or path segment becomes an [`ApiError`] with the status
//! axum would have used.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);
