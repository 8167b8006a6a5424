#![forbid(unsafe_code)]

pub mod deck_builder;
pub mod model;
pub mod route;

pub use deck_builder::{build_deck, build_deck_with, filter_by_unit};
pub use route::Route;
