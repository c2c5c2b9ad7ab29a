use actix_web::{http::StatusCode, HttpResponse};

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> HttpResponse {
    json_error_with_details(status, message, None)
}

pub(crate) fn json_error_with_details(
    status: StatusCode,
    message: impl Into<String>,
    details: Option<&str>,
) -> HttpResponse {
    let mut body = serde_json::json!({
        "error": message.into(),
    });
    if let Some(details) = details {
        body["details"] = serde_json::Value::String(details.to_string());
    }
    HttpResponse::build(status).json(body)
}
