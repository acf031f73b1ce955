pub mod action_log;
pub mod analysis;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod export;
pub mod http_client;
pub mod identity;
pub mod model;
pub mod persist;
pub mod report;
pub mod score;
pub mod session;
pub mod state;
pub mod sync;
pub mod zones;
