use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::state::AppState;

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Gate for protected routes.
///
/// Resolves the bearer token into an [`Identity`](super::Identity) and stores
/// it in the request extensions. A missing and an invalid token produce the
/// same 401. Never touches persistence.
pub async fn protect(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_bearer_token(request.headers()) else {
        tracing::debug!(uri = %request.uri(), "no bearer token on protected route");
        return Err(AppError::Unauthenticated);
    };

    let identity = state.tokens.verify(token)?;
    tracing::debug!(user_id = %identity.user_id, role = %identity.role, "authenticated");

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Identity, Role};
    use crate::db::models::User;
    use axum::{body::Body, http::StatusCode, middleware, routing::get, Extension, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        format!("{}:{}", identity.user_id, identity.role)
    }

    fn router(state: AppState) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(middleware::from_fn_with_state(state.clone(), protect))
            .with_state(state)
    }

    async fn call(app: Router, auth: Option<String>) -> (StatusCode, String) {
        let mut req = axum::http::Request::get("/me");
        if let Some(value) = auth {
            req = req.header("authorization", value);
        }
        let res = app.oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert("authorization", "Basic abc".parse().unwrap());
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert("authorization", "Bearer abc.def.ghi".parse().unwrap());
        assert_eq!(extract_bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let (status, _) = call(router(AppState::for_tests()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_invalid_token_is_unauthenticated() {
        let (status, body) = call(
            router(AppState::for_tests()),
            Some("Bearer invalid.jwt.token".into()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Unauthenticated"));
    }

    #[tokio::test]
    async fn test_valid_token_attaches_identity() {
        let state = AppState::for_tests();
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: String::new(),
            role: Role::Standard,
            created_at: chrono::Utc::now(),
        };
        let token = state.tokens.issue(&user).unwrap();

        let (status, body) = call(router(state), Some(format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{}:standard", user.id));
    }
}
