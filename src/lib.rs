#[cfg(test)]
#[macro_use]
extern crate page_test;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod page;
pub mod surface;
pub mod ticker;

pub use config::Config;
pub use error::{Error, Result};
pub use page::VotePage;
