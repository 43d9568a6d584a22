//! # Blog Core
//!
//! The domain layer of the blog.
//! Posts, comments, tags and the ports their stores must implement.
//! No infrastructure dependencies live here.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
