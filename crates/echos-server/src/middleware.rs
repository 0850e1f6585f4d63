use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use echos_types::api::Caller;

/// Extract the caller identity injected by the upstream identity
/// provider. The three headers arrive pre-authenticated on an internal
/// hop; this layer only parses them and never verifies credentials.
pub async fn require_identity(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    // Scope the borrowing closure so its immutable borrow of `req` ends
    // before `req` is moved into `next.run`; otherwise the capture region
    // defeats inference of the middleware's future type.
    let (id, role, email) = {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };

        let id = header("x-user-id")
            .and_then(|v| v.parse().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let role = header("x-user-role")
            .and_then(|v| v.parse().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;
        let email = header("x-user-email").ok_or(StatusCode::UNAUTHORIZED)?;
        (id, role, email)
    };

    req.extensions_mut().insert(Caller { id, role, email });
    Ok(next.run(req).await)
}
