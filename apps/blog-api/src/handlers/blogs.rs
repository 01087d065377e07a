//! Blog handlers.

use actix_web::http::header;
use actix_web::{HttpResponse, web};

use blog_core::domain::Blog;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ENTITY_NAME: &str = "blog";

async fn create(state: &AppState, identity: &Identity, mut blog: Blog) -> AppResult<HttpResponse> {
    blog.validate()?;
    blog.user_id = Some(identity.user_id);

    let stored = state.blogs.save(blog).await?;
    let id = stored
        .id
        .ok_or_else(|| AppError::Internal("blog store returned a blog without id".to_string()))?;

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, format!("/api/blogs/{id}")));
    state.alerts.entity_creation(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// POST /api/blogs
///
/// The caller becomes the owner of the new blog.
pub async fn create_blog(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Blog>,
) -> AppResult<HttpResponse> {
    let blog = body.into_inner();
    tracing::debug!(name = %blog.name, "REST request to save Blog");

    if blog.id.is_some() {
        let message = "A new blog cannot already have an ID";
        return Err(AppError::EntityRejected {
            entity: ENTITY_NAME,
            key: "idexists",
            message: message.to_string(),
            alert: state.alerts.failure(ENTITY_NAME, "idexists", message),
        });
    }

    create(&state, &identity, blog).await
}

/// PUT /api/blogs
pub async fn update_blog(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<Blog>,
) -> AppResult<HttpResponse> {
    let mut blog = body.into_inner();
    tracing::debug!(id = ?blog.id, name = %blog.name, "REST request to update Blog");

    let Some(id) = blog.id else {
        return create(&state, &identity, blog).await;
    };

    blog.validate()?;
    if blog.user_id.is_none() {
        blog.user_id = Some(identity.user_id);
    }
    let stored = state.blogs.save(blog).await?;

    let mut response = HttpResponse::Ok();
    state.alerts.entity_update(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// GET /api/blogs
pub async fn list_blogs(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    tracing::debug!(login = %identity.login, "REST request to get all Blogs");

    let blogs = state.blogs.find_by_user_login(&identity.login).await?;
    Ok(HttpResponse::Ok().json(blogs))
}

/// GET /api/blogs/{id}
pub async fn get_blog(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to get Blog");

    match state.blogs.find_by_id(id).await? {
        Some(blog) => Ok(HttpResponse::Ok().json(blog)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// DELETE /api/blogs/{id}
///
/// Entries of the blog are deleted with it, in the store and in the
/// search index.
pub async fn delete_blog(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to delete Blog");

    let entry_ids = state.entries.find_ids_by_blog(id).await?;
    state.blogs.delete(id).await?;

    for entry_id in &entry_ids {
        state.entry_search.delete(*entry_id).await?;
    }
    if !entry_ids.is_empty() {
        tracing::debug!(id, count = entry_ids.len(), "Removed entries of deleted blog from search index");
    }

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
    async fn test_create_assigns_caller_as_owner() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "name": "Second thoughts", "handle": "second" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(
            resp.headers().get("Location").unwrap().to_str().unwrap(),
            "/api/blogs/2"
        );
        let created: Value = test::read_body_json(resp).await;
        assert_eq!(created["user_id"], 1);

        let req = test::TestRequest::get()
            .uri("/api/blogs")
            .insert_header(("Authorization", auth))
            .to_request();
        let blogs: Vec<Value> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(blogs.len(), 2);
    }

    #[actix_rt::test]
    async fn test_create_rejects_id_and_invalid_fields() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({ "id": 5, "name": "Named", "handle": "nm" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get("X-blogApp-error").unwrap().to_str().unwrap(),
            "error.idexists"
        );

        let req = test::TestRequest::post()
            .uri("/api/blogs")
            .insert_header(("Authorization", auth))
            .set_json(json!({ "name": "ab", "handle": "h" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_update_unknown_blog_is_not_found() {
        let fixture = Fixture::new();
        let (auth, _) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::put()
            .uri("/api/blogs")
            .insert_header(("Authorization", auth))
            .set_json(json!({ "id": 77, "name": "Ghost", "handle": "ghost" }))
            .to_request();

        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_delete_cascades_to_entries() {
        let fixture = Fixture::new();
        let (auth, blog_id) = fixture.user_with_blog("alice").await;
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/entries")
            .insert_header(("Authorization", auth.clone()))
            .set_json(json!({
                "title": "Doomed", "content": "soon gone",
                "date": "2016-05-01T12:00:00Z", "blog": { "id": blog_id }
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/blogs/{blog_id}"))
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/entries/1")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri("/api/_search/entries?query=doomed")
            .insert_header(("Authorization", auth.clone()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.headers().get("X-Total-Count").unwrap().to_str().unwrap(), "0");
        let hits: Vec<Value> = test::read_body_json(resp).await;
        assert!(hits.is_empty());
        assert_eq!(fixture.index.calls.deletes(), 1);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/blogs/{blog_id}"))
            .insert_header(("Authorization", auth))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
