pub mod auth;
pub mod budget;
pub mod chat;
pub mod config;
