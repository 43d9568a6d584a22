//! # Blog Infrastructure
//!
//! Concrete implementations of the ports defined in `blog-core`.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL storage via SeaORM
//! - `minimal` - No external dependencies, in-memory only

pub mod database;
pub mod memory;

pub use database::DatabaseConnections;
pub use memory::InMemoryBlogStore;
