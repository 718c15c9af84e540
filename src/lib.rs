#![deny(unsafe_code)]

pub mod assets;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod context;
pub mod opts;
pub mod pipeline;
pub mod plist;
pub mod project;
pub mod step;
pub mod target;

pub static NAME: &str = "cloudkit";
