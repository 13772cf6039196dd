pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod rest;


pub use client::Client;
pub use error::RemoteOperationError;
