// Library surface shared by the binary and the integration tests.
// Terminal drawing and the App struct live in main.rs.
pub mod app_dirs;
pub mod arcade;
pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod focus;
pub mod inspiration;
pub mod leaderboard;
pub mod logging;
pub mod progression;
pub mod runtime;
pub mod scheduler;
pub mod storage;

pub use error::{Error, Result};
