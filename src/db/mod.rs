mod connection;
pub mod helpers;
mod migrations;
pub mod models;
mod repositories;
pub mod seed;

pub use connection::Database;
