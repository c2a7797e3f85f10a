pub mod attachment;
pub mod client;
pub mod models;
