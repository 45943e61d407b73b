// Relay module: everything between an inbound chat command and the
// messages it produces. Shared by the binary and the integration tests.

pub mod chunker;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gateway;
pub mod live;
pub mod protocol;
pub mod render;
pub mod sorting;
pub mod upload;
pub mod watch;
