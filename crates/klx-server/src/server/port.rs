//! Free port selection.

use std::net::TcpListener;

/// First port in `start..=end` that can be bound on `host`.
pub fn find_available_port(host: &str, start: u16, end: u16) -> Option<u16> {
    (start..=end.max(start)).find(|port| TcpListener::bind((host, *port)).is_ok())
}
