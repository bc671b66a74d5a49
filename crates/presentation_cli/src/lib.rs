//! DrySpot command-line interface
//!
//! Argument parsing and presenters live here so they can be tested without
//! running the binary.

pub mod cli;
pub mod presenter;

pub use cli::{Cli, Commands};
pub use presenter::{JsonPresenter, TextPresenter, maps_link};
