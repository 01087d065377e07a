//! Per-endpoint request timing.

use std::time::Instant;

use actix_web::Error;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::middleware::Next;

pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Logs method, matched route, status and duration of every request, and
/// reports the duration in `X-Response-Time`.
pub async fn request_timing(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let start = Instant::now();
    let method = req.method().clone();
    // Templated route, so timings group per endpoint rather than per id.
    let route = req.match_pattern().unwrap_or_else(|| req.path().to_string());

    let mut response = next.call(req).await?;

    let duration = start.elapsed();
    tracing::info!(
        method = %method,
        route = %route,
        status = response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&format!("{}ms", duration.as_millis())) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(RESPONSE_TIME_HEADER), value);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::middleware::from_fn;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    #[actix_rt::test]
    async fn test_timing_header_added_without_changing_response() {
        let app = test::init_service(
            App::new()
                .wrap(from_fn(request_timing))
                .route("/api/entries/{id}", web::get().to(|| async { HttpResponse::NotFound().finish() })),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/entries/7").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let timing = resp.headers().get(RESPONSE_TIME_HEADER).unwrap().to_str().unwrap();
        assert!(timing.ends_with("ms"));
    }
}
