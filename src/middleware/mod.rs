//! HTTP middleware

pub mod auth;
pub mod guard;
pub mod logging;
pub mod tenant;
