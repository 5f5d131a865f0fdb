// hubctl-api: Async Rust client for the smart-home hub's local admin API

pub mod account;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod services;
pub mod subdevices;
pub mod transport;

pub use client::AdminClient;
pub use error::Error;
