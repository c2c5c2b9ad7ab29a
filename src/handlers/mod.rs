pub(crate) mod auth;
pub(crate) mod leaderboard;

use std::time::{SystemTime, UNIX_EPOCH};

use actix_web::{http::StatusCode, web, HttpResponse, Responder};

use crate::config::SERVICE_NAME;
use crate::response::json_error;
use crate::types::HealthResponse;

pub(crate) fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis().min(u128::from(u64::MAX)) as u64)
        .unwrap_or(0)
}

pub(crate) async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: now_unix_ms(),
        service: SERVICE_NAME,
    })
}

pub(crate) async fn not_found() -> impl Responder {
    json_error(StatusCode::NOT_FOUND, "Endpoint not found")
}

/// Full route table; shared between `main` and the handler tests.
pub(crate) fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/health", web::get().to(health))
        .route("/api/leaderboard/top100", web::get().to(leaderboard::top100))
        .route("/api/leaderboard/submit", web::post().to(leaderboard::submit))
        .route(
            "/api/leaderboard/player/{user_id}",
            web::get().to(leaderboard::player),
        )
        .route(
            "/api/auth/create-account",
            web::post().to(auth::create_account),
        )
        .route(
            "/api/auth/check-wallet/{wallet_address}",
            web::get().to(auth::check_wallet),
        )
        .route("/api/auth/sign-in", web::post().to(auth::sign_in))
        .route(
            "/api/auth/update-username",
            web::put().to(auth::update_username),
        )
        .default_service(web::route().to(not_found));
}
