//! Middleware for the API surface. Browser front ends consume the run
//! endpoints directly, so CORS stays permissive.
use tower_http::cors::CorsLayer;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}
