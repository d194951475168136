//! # Observability & Tracing
//!
//! Structured logging for the router and the services built on it.
//!
//! ## What Gets Traced
//!
//! - **Startup**: each registered resource (`debug`) and the route count (`info`)
//! - **Requests**: every dispatch runs in a `dispatch` span carrying `method`,
//!   `path` and the final `status`
//! - **Errors**: domain errors at `warn`, internal failures at `error`. Internal
//!   error details are only ever logged, never returned to the caller.
//!
//! ## Usage Examples
//!
//! ```bash
//! # Request summaries
//! RUST_LOG=info cargo run -p storage-service
//!
//! # Matched routes and registration details
//! RUST_LOG=remple=debug cargo run -p storage-service
//! ```
//!
//! With `RUST_LOG=info` a request looks like:
//!
//! ```text
//! INFO dispatch{method=GET path=/locations/1f0c.../}: Dispatched status=200
//! ```

/// Installs a compact `tracing_subscriber::fmt` subscriber filtered by
/// `RUST_LOG`.
///
/// Call once, early in `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
