pub mod aggregate;
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod filter;
pub mod git;
pub mod model;
pub mod parse;
pub mod render;
pub mod report;
pub mod util;

pub use error::{GitCountError, Result};
