pub mod bus;
pub mod command;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod packet;
pub mod registry;
pub mod speaker;

// Re-export the protocol engine for easy access
pub use engine::Soundbound;
