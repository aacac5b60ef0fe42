pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod types;
