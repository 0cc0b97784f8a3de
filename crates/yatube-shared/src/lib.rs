//! # Yatube Shared
//!
//! Wire types shared by the web server and its clients:
//! HTML form payloads, JSON API bodies and RFC 7807 errors.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, ListResponse};
