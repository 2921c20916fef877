//! Configuration module.
//!
//! Re-exports every layout constant from [`constants`]. Import from here
//! rather than hard-coding sizes:
//!
//! ```ignore
//! use crate::config::{PAGE_SIZE, ROW_SIZE};
//! ```

mod constants;

pub use constants::*;
