//! View state and its controller.
//!
//! - `machine`: pure state transitions
//! - `controller`: async driver that owns the state

pub mod controller;
pub mod machine;

pub use controller::{Browser, Fetcher, LoadTicket};
pub use machine::{Event, POST_ERROR, Page, Phase, SOLVER_MISSING, ViewState, WRITEUP_ERROR};
