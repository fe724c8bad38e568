//! HTTP edge of the Secvo scan service: the versioned dashboard API, the
//! processing trigger and the operational endpoints.

pub mod app;
pub mod handlers;
pub mod infra;
pub mod routes;
pub mod users;

pub use app::create_app;
pub use infra::app_state::AppState;
