//! Account handlers.

use actix_web::{HttpResponse, web};

use blog_core::domain::User;
use blog_shared::dto::{AccountResponse, AuthResponse, LoginRequest, RegisterUserRequest};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn issue_token(state: &AppState, user: &User) -> AppResult<AuthResponse> {
    let user_id = user
        .id
        .ok_or_else(|| AppError::Internal("user store returned a user without id".to_string()))?;

    let token = state
        .tokens
        .generate_token(user_id, &user.login, vec!["user".to_string()])
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(AuthResponse::bearer(
        token,
        state.tokens.expiration_seconds().max(0) as u64,
    ))
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.login.trim().is_empty() {
        return Err(AppError::BadRequest("Login must not be empty".to_string()));
    }
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if state.users.find_by_login(&req.login).await?.is_some() {
        return Err(AppError::Conflict("Login already in use".to_string()));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = state
        .passwords
        .hash(&req.password)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let user = state
        .users
        .save(User::new(req.login, req.email, password_hash))
        .await?;
    tracing::info!(login = %user.login, "Registered account");

    Ok(HttpResponse::Created().json(issue_token(&state, &user)?))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state
        .users
        .find_by_login(&req.login)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let valid = state
        .passwords
        .verify(&req.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !valid {
        tracing::debug!(login = %req.login, "Rejected login");
        return Err(AppError::Unauthorized);
    }

    Ok(HttpResponse::Ok().json(issue_token(&state, &user)?))
}

/// GET /api/auth/me
pub async fn me(identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(AccountResponse {
        id: identity.user_id,
        login: identity.login,
        roles: identity.roles,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    use crate::handlers::test_support::{Fixture, init_app};

    fn registration(login: &str, email: &str) -> Value {
        json!({ "login": login, "email": email, "password": "correct horse" })
    }

    #[actix_rt::test]
    async fn test_register_login_me() {
        let fixture = Fixture::new();
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("carol", "carol@example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let registered: Value = test::read_body_json(resp).await;
        assert_eq!(registered["token_type"], "Bearer");
        assert_eq!(registered["expires_in"], 24 * 3600);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": "carol", "password": "correct horse" }))
            .to_request();
        let logged_in: Value = test::call_and_read_body_json(&app, req).await;
        let token = logged_in["access_token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let account: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(account["login"], "carol");
        assert_eq!(account["id"], 1);
    }

    #[actix_rt::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let fixture = Fixture::new();
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("dave", "dave@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("dave", "other@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("erin", "dave@example.com"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({ "login": "frank", "email": "frank", "password": "short" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_login_with_wrong_password() {
        let fixture = Fixture::new();
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(registration("gina", "gina@example.com"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": "gina", "password": "wrong password" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({ "login": "nobody", "password": "whatever1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_me_with_garbage_token() {
        let fixture = Fixture::new();
        let app = init_app!(fixture.state.clone());

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(("Authorization", "Bearer not.a.token"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let problem: Value = test::read_body_json(resp).await;
        assert_eq!(problem["title"], "Invalid Token");
    }
}
