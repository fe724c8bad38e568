pub mod auth;
pub mod scan;
