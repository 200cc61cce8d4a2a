pub mod card;
pub mod cli;
pub mod compositor;
pub mod detection;
pub mod error;
pub mod generator;

pub use error::{Error, Result};
