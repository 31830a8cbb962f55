//! HTTP gateway exposing the workflow engine.

pub mod routes;
pub mod server;
pub mod state;

pub use server::GatewayServer;
pub use state::AppState;
