// rtelegram library: relay core, daemon client and chat client
// The binary in main.rs wires these together; tests drive them directly.

// Relay core (ordering, rendering, chunking, delivery, live sessions, commands)
pub mod relay;

// rTorrent client (XML-RPC over SCGI)
pub mod rtorrent;

// Telegram Bot API client
pub mod telegram;

// Polling helpers for async tests
pub mod test_utils;
