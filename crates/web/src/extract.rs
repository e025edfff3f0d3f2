use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};

use crate::error::WebError;

/// `axum::Json` whose rejections render as [`WebError`] bodies
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(WebError))]
pub struct ApiJson<T>(pub T);

impl<T: serde::Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}
