pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod session;
pub mod url_builder;

#[cfg(test)]
pub mod testing;
