//! Scout Protocol - Core types for the research agent contract
//!
//! Defines the user query, the normalized agent response and the error
//! taxonomy shared by the HTTP client and the console.

pub mod constants;
pub mod error;
pub mod query;
pub mod response;

pub use constants::*;
pub use error::*;
pub use query::Query;
pub use response::AgentResponse;
