use axum::http::StatusCode;

pub async fn index() -> &'static str {
    "Workout Gear Server"
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
