//! WebSocket infrastructure for real-time catalog change notifications.
//!
//! Provides connection management, heartbeat monitoring, the catalog event
//! payloads, and the HTTP upgrade handler used by Axum routes.

mod events;
mod handler;
mod heartbeat;
pub mod manager;

pub use events::CatalogEvent;
pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
