//! REST controller for blog entries.
//!
//! Every write goes to the entry store first and is then mirrored into the
//! search index. The two writes are sequential and not transactional: if the
//! index write fails, the stored change stays and the request fails with 500.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use serde::Deserialize;

use blog_core::domain::Entry;

use super::pagination::{Pageable, apply_headers, pagination_headers, search_pagination_headers};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const ENTITY_NAME: &str = "entry";

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
}

fn stored_id(entry: &Entry) -> AppResult<i64> {
    entry
        .id
        .ok_or_else(|| AppError::Internal("entry store returned an entry without id".to_string()))
}

async fn save_and_index(state: &AppState, entry: Entry) -> AppResult<Entry> {
    let stored = state.entries.save(entry).await?;
    state.entry_search.save(&stored).await?;
    Ok(stored)
}

async fn create(state: &AppState, entry: Entry) -> AppResult<HttpResponse> {
    let stored = save_and_index(state, entry).await?;
    let id = stored_id(&stored)?;

    let mut response = HttpResponse::Created();
    response.insert_header((header::LOCATION, format!("/api/entries/{id}")));
    state.alerts.entity_creation(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// POST /api/entries
pub async fn create_entry(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<Entry>,
) -> AppResult<HttpResponse> {
    let entry = body.into_inner();
    tracing::debug!(title = %entry.title, "REST request to save Entry");

    if entry.id.is_some() {
        let message = "A new entry cannot already have an ID";
        return Err(AppError::EntityRejected {
            entity: ENTITY_NAME,
            key: "idexists",
            message: message.to_string(),
            alert: state.alerts.failure(ENTITY_NAME, "idexists", message),
        });
    }

    create(&state, entry).await
}

/// PUT /api/entries
///
/// An entry without id is created instead.
pub async fn update_entry(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<Entry>,
) -> AppResult<HttpResponse> {
    let entry = body.into_inner();
    tracing::debug!(id = ?entry.id, title = %entry.title, "REST request to update Entry");

    if entry.id.is_none() {
        return create(&state, entry).await;
    }

    let stored = save_and_index(&state, entry).await?;
    let id = stored_id(&stored)?;

    let mut response = HttpResponse::Ok();
    state.alerts.entity_update(ENTITY_NAME, id).apply(&mut response);
    Ok(response.json(stored))
}

/// GET /api/entries
///
/// Entries of blogs owned by the caller, newest first.
pub async fn list_entries(
    state: web::Data<AppState>,
    identity: Identity,
    pageable: Pageable,
) -> AppResult<HttpResponse> {
    let request = pageable.into_inner();
    tracing::debug!(login = %identity.login, page = request.page, "REST request to get a page of Entries");

    let page = state
        .entries
        .find_by_blog_owner_order_by_date_desc(&identity.login, &request)
        .await?;

    let mut response = HttpResponse::Ok();
    apply_headers(&mut response, pagination_headers(&page, "/api/entries"));
    Ok(response.json(page.content))
}

/// GET /api/entries/{id}
pub async fn get_entry(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to get Entry");

    match state.entries.find_one_with_eager_relationships(id).await? {
        Some(entry) => Ok(HttpResponse::Ok().json(entry)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}

/// DELETE /api/entries/{id}
pub async fn delete_entry(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    tracing::debug!(id, "REST request to delete Entry");

    state.entries.delete(id).await?;
    state.entry_search.delete(id).await?;

    let mut response = HttpResponse::Ok();
    state.alerts.entity_deletion(ENTITY_NAME, id).apply(&mut response);
    Ok(response.finish())
}

/// GET /api/_search/entries?query=
pub async fn search_entries(
    state: web::Data<AppState>,
    _identity: Identity,
    params: web::Query<SearchParams>,
    pageable: Pageable,
) -> AppResult<HttpResponse> {
    let query = params.into_inner().query;
    let request = pageable.into_inner();
    tracing::debug!(query = %query, page = request.page, "REST request to search for a page of Entries");

    let page = state.entry_search.search(&query, &request).await?;

    let mut response = HttpResponse::Ok();
    apply_headers(
        &mut response,
        search_pagination_headers(&query, &page, "/api/_search/entries"),
    );
    Ok(response.json(page.content))
}
