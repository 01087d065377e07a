//! Tag handlers.

use actix_web::http::header;
use actix_web::{HttpResponse, web};

use blog_core::domain::Tag;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ENTITY_NAME: &str = "tag";

async fn create(state: &AppState, tag: Tag) -> AppResult<HttpResponse> {
    tag.validate()?;

    let stored = state.tags.save(tag).await?;
    let id = stored
        .id
        .ok_or_else(|| AppError::Internal("tag store returned a tag without id".to_string()))?;

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, format!("/api/tags/{id}")));
    state.alerts.entity_creation(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// POST /api/tags
pub async fn create_tag(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<Tag>,
) -> AppResult<HttpResponse> {
    let tag = body.into_inner();
    tracing::debug!(name = %tag.name, "REST request to save Tag");

    if tag.id.is_some() {
        let message = "A new tag cannot already have an ID";
        return Err(AppError::EntityRejected {
            entity: ENTITY_NAME,
            key: "idexists",
            message: message.to_string(),
            alert: state.alerts.failure(ENTITY_NAME, "idexists", message),
        });
    }

    create(&state, tag).await
}

/// PUT /api/tags
pub async fn update_tag(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<Tag>,
) -> AppResult<HttpResponse> {
    let tag = body.into_inner();
    tracing::debug!(id = ?tag.id, name = %tag.name, "REST request to update Tag");

    let Some(id) = tag.id else {
        return create(&state, tag).await;
    };

    tag.validate()?;
    let stored = state.tags.save(tag).await?;

    let mut response = HttpResponse::Ok();
    state.alerts.entity_update(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// GET /api/tags
pub async fn list_tags(state: web::Data<AppState>, _identity: Identity) -> AppResult<HttpResponse> {
    tracing::debug!("REST request to get all Tags");
    Ok(HttpResponse::Ok().json(state.tags.find_all().await?))
}

/// GET /api/tags/{id}
pub async fn get_tag(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to get Tag");

    match state.tags.find_by_id(id).await? {
        Some(tag) => Ok(HttpResponse::Ok().json(tag)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// DELETE /api/tags/{id}
pub async fn delete_tag(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to delete Tag");

    state.tags.delete(id).await?;

    let mut response = HttpResponse::Ok();
    state.alerts.entity_deletion(ENTITY_NAME, id).apply(&mut response);
    Ok(response.finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::handlers::test_support::{Fixture, init_app};

    #[actix_rt::test]
    async fn test_tags_listed_by_name() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        for name in ["web", "async", "rust"] {
            let req = test::TestRequest::post()
                .uri("/api/tags")
                .insert_header(("Authorization", auth.clone()))
                .set_json(json!({ "name": name }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/tags")
            .insert_header(("Authorization", auth))
            .to_request();
        let tags: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = tags.iter().map(|t| t["name"].as_str().unwrap()).collect();

        assert_eq!(names, vec!["async", "rust", "web"]);
    }

    #[actix_rt::test]
    async fn test_rename_tag() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/tags")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "name": "rsut" }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri("/api/tags")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "id": created["id"], "name": "rust" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("X-blogApp-alert").unwrap().to_str().unwrap(),
            "A tag is updated with identifier 1"
        );

        let req = test::TestRequest::get()
            .uri("/api/tags/1")
            .insert_header(("Authorization", auth))
            .to_request();
        let fetched: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched["name"], "rust");
    }

    #[actix_rt::test]
    async fn test_missing_tag() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::get()
            .uri("/api/tags/3")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete()
            .uri("/api/tags/3")
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
