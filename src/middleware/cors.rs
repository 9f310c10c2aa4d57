use tower_http::cors::{Any, CorsLayer};

// Browser clients send X-Child-Id on child-scoped calls, so headers stay open.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
