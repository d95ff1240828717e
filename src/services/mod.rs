//! Service layer for the writeups application.
//!
//! This module contains the business logic for:
//! - Catalog building (`Aggregator`)
//! - Lazy item loading (`load_challenge`, `load_post`, `find_solver`)

pub mod aggregator;
pub mod loader;

pub use aggregator::Aggregator;
pub use loader::{LoadedItem, download_link, find_solver, load_challenge, load_post};
