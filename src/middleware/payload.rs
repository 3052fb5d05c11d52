use axum::{extract::FromRequest, Json};

use crate::error::ApiError;

/// JSON request body whose rejections render as `ApiError`
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct Payload<T>(pub T);
