// Library root for the account service

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod store;
