//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;
mod users;

use actix_web::web;
use uuid::Uuid;

use crate::middleware::error::{AppError, AppResult};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::post().to(posts::create))
                    .route("", web::get().to(posts::list_by_account))
                    .route("/{id}", web::get().to(posts::fetch))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::remove))
                    .route("/{id}/publish", web::post().to(posts::publish))
                    .route("/{id}/redact", web::post().to(posts::redact)),
            )
            .service(
                web::scope("/accounts")
                    .route("", web::post().to(accounts::create))
                    .route("", web::get().to(accounts::list))
                    .route("/{id}", web::get().to(accounts::fetch))
                    .route("/{id}", web::put().to(accounts::update))
                    .route("/{id}", web::delete().to(accounts::remove)),
            )
            .service(
                web::scope("/users")
                    .route("", web::post().to(users::create))
                    .route("", web::get().to(users::list))
                    .route("/{id}", web::get().to(users::fetch))
                    .route("/{id}", web::put().to(users::update))
                    .route("/{id}", web::delete().to(users::remove)),
            ),
    );
}

/// Malformed JSON bodies become RFC 7807 bad requests.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("malformed body: {}", err)).into())
}

/// Parse a path or query identifier, rejecting malformed values with 400.
fn parse_id(raw: &str, field: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest(format!("{} is improperly formatted", field)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use divulge_core::ports::ContentStore;
    use divulge_infra::content::InMemoryContentStore;

    use crate::config::ContentConfig;
    use crate::state::AppState;

    pub fn in_memory_state() -> AppState {
        state_with_content(Arc::new(InMemoryContentStore::new()))
    }

    pub fn state_with_content(content: Arc<dyn ContentStore>) -> AppState {
        let config = ContentConfig {
            root: "unused".into(),
            extension: "md".to_string(),
        };
        AppState::in_memory(content, &config)
    }
}
