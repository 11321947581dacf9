pub mod browser;
pub mod cdp;
pub mod config;
pub mod error;
pub mod format;
pub mod interaction;
pub mod locator;
pub mod mock;
pub mod pages;
pub mod runner;
pub mod scenarios;
pub mod session;
pub mod wait;

pub use error::{E2eError, Result};
