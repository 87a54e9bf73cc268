//! # Gazette Shared
//!
//! Wire types shared between the API server and its clients: request/response
//! DTOs and the RFC 7807 error envelope.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse, FieldError};
