#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

mod commands;
mod driver;
mod error;
pub mod status;

pub use commands::{ADDRESS_ADAFRUIT, ADDRESS_SPARKFUN};
pub use driver::{EepromWaitPolicy, MCP4725};
pub use error::Error;
pub use status::PowerDown;
