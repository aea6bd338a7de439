// Upstream network client module

mod client;

pub use client::NetworkClient;
