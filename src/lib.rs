pub mod backup;
pub mod cli;
pub mod config;
pub mod database;
pub mod logging;
pub mod models;
pub mod scheduler;
pub mod tui;
pub mod utils;

pub use config::Config;
pub use database::Database;
pub use models::{Card, LeitnerBox};
pub use utils::Profile;
