//! HTTP surface: pages, health, static assets

mod embedded;
pub mod flash;
pub mod middleware;
pub mod render;
pub mod routes;
mod server;
pub mod types;

pub use server::{ApiServer, AppState, router};
