pub mod websocket_server;

pub use websocket_server::{serve, serve_incoming};
