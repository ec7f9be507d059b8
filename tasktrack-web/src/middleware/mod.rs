/// Middleware for the web server
///
/// - Security headers on every response
///
/// Session authentication lives next to the router in `app.rs`, since it
/// needs the application state.

pub mod security;
