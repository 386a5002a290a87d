pub mod access;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod health;
pub mod state;
pub mod users;

#[cfg(test)]
mod testing;
