pub mod auth;
pub mod chat;
pub mod file;
pub mod repo;
pub mod settings;
