// Server module entry
// Provides listener setup, TLS, connection handling and signal handling

pub mod connection;
pub mod listener;
pub mod server_loop;
pub mod signal;
pub mod tls;

// Re-export commonly used items
pub use listener::create_listener;
pub use server_loop::start_server_loop;
pub use signal::start_signal_handler;
pub use tls::load_acceptor;
