// src/lib.rs

//! Writeups Library
//!
//! Catalogs CTF writeups and blog posts from a GitHub repository or a local
//! mirror, loads them on demand, and serves the mirror over a small HTTP API.

pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod source;
pub mod state;
pub mod utils;
