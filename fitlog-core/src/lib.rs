pub mod admin;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;

pub use errors::{FitnessError, Result};
