pub mod config;
pub mod error;
pub mod gate;
pub mod models;
pub mod pages;
pub mod routes;
pub mod state;
pub mod store;
