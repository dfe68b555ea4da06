//! # domains
//!
//! The central domain model and port definitions for Agora, a community
//! board: user accounts write articles, articles carry hashtags and
//! threaded comments.

pub mod error;
pub mod models;
pub mod paging;
pub mod ports;

pub use error::{BoardError, Result};
pub use models::*;
pub use paging::{Page, PageRequest, SortDirection, SortKey};
pub use ports::*;
