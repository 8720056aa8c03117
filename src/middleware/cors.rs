//! Middleware CORS

use tower_http::cors::{Any, CorsLayer};

/// CORS permisivo; este servicio no expone credenciales de navegador
pub fn cors_middleware() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
