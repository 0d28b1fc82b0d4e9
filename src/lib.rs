pub mod config;
pub mod content;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod paths;
pub mod player;
pub mod router;
pub mod session;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

pub use router::router;
