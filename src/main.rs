mod challenge;
mod config;
mod error;
mod handlers;
mod response;
mod signature;
mod store;
#[cfg(test)]
mod testutil;
mod types;
mod username;

use std::{env, io, path::Path, sync::Arc};

use actix_cors::Cors;
use actix_web::{error::JsonPayloadError, http::StatusCode, middleware, web, App, HttpServer};

use crate::config::{
    read_env_usize, AppState, ServerPolicy, DEFAULT_BIND_ADDR, DEFAULT_DATA_DIR,
    DEFAULT_JSON_LIMIT_BYTES, SERVICE_NAME,
};
use crate::response::json_error_with_details;
use crate::store::Store;

/// Rewrite actix's JSON deserialization failures into the service's
/// `{error, details}` body shape.
fn json_payload_error(err: JsonPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    let details = err.to_string();
    actix_web::error::InternalError::from_response(
        err,
        json_error_with_details(StatusCode::BAD_REQUEST, "Invalid JSON body", Some(&details)),
    )
    .into()
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let json_limit = read_env_usize("JSON_LIMIT_BYTES", DEFAULT_JSON_LIMIT_BYTES);
    let policy = ServerPolicy::from_env();

    let store = Store::open(Path::new(&data_dir)).map_err(|e| io::Error::other(e.to_string()))?;

    if policy.allow_dev_mode_requests {
        tracing::warn!(
            "ALLOW_DEV_MODE_REQUESTS is set: account creation may skip signature verification"
        );
    }

    tracing::info!(
        "starting {SERVICE_NAME}: bind_addr={} data_dir={} max_score={} top_limit={}",
        bind_addr,
        data_dir,
        policy.max_score,
        policy.top_limit
    );

    let state = AppState {
        store: Arc::new(store),
        policy,
    };

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(
                web::JsonConfig::default()
                    .limit(json_limit)
                    .error_handler(json_payload_error),
            )
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
