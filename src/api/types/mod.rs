//! API request and response types

pub mod error;
pub mod extract;
pub mod response;

pub use error::{ApiError, ApiErrorResponse};
pub use extract::{Json, Query};
pub use response::QueryResponse;
