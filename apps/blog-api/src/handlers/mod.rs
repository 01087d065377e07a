//! HTTP handlers and route configuration.

mod auth;
mod blogs;
mod entries;
pub mod headers;
mod health;
pub mod pagination;
mod tags;
#[cfg(test)]
mod test_support;

use actix_web::{HttpResponse, error, web};
use blog_shared::ErrorResponse;

/// Malformed JSON bodies become RFC 7807 problem responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        tracing::debug!("Rejected request body: {}", detail);
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(detail)),
        )
        .into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let detail = err.to_string();
        error::InternalError::from_response(
            err,
            HttpResponse::BadRequest().json(ErrorResponse::bad_request(detail)),
        )
        .into()
    })
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(json_config())
            .app_data(query_config())
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Authenticated resources
            .service(
                web::scope("/entries")
                    .route("", web::post().to(entries::create_entry))
                    .route("", web::put().to(entries::update_entry))
                    .route("", web::get().to(entries::list_entries))
                    .route("/{id}", web::get().to(entries::get_entry))
                    .route("/{id}", web::delete().to(entries::delete_entry)),
            )
            .route("/_search/entries", web::get().to(entries::search_entries))
            .service(
                web::scope("/blogs")
                    .route("", web::post().to(blogs::create_blog))
                    .route("", web::put().to(blogs::update_blog))
                    .route("", web::get().to(blogs::list_blogs))
                    .route("/{id}", web::get().to(blogs::get_blog))
                    .route("/{id}", web::delete().to(blogs::delete_blog)),
            )
            .service(
                web::scope("/tags")
                    .route("", web::post().to(tags::create_tag))
                    .route("", web::put().to(tags::update_tag))
                    .route("", web::get().to(tags::list_tags))
                    .route("/{id}", web::get().to(tags::get_tag))
                    .route("/{id}", web::delete().to(tags::delete_tag)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;

    use super::test_support::{Fixture, init_app};

    #[actix_rt::test]
    async fn test_health_is_public() {
        let fixture = Fixture::new();
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }
}
