pub mod api;
pub mod auth;
pub mod guard;
pub mod url;
