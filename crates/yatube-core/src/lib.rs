//! # Yatube Core
//!
//! The domain layer of the Yatube blog.
//! Posts, groups and authors, the rules they obey, and the ports
//! that storage and authentication backends implement.

pub mod domain;
pub mod error;
pub mod ports;

pub use error::{DomainError, RepoError};
