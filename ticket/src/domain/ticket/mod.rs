pub mod context;
pub mod errors;
pub mod expiry;
pub mod id;
pub mod models;
pub mod ports;
pub mod service;
