use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorBody {
    pub message: String,
    pub errors: Vec<FieldError>,
}

/// One rejected request field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: Option<String>,
    pub msg: String,
    pub path: String,
    pub location: String,
}

pub fn success<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<MessageBody>) {
    (status, Json(MessageBody { message }))
}

pub fn invalid_arguments(errors: Vec<FieldError>) -> (StatusCode, Json<ValidationErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ValidationErrorBody {
            message: "Invalid argument(s).".to_string(),
            errors,
        }),
    )
}
