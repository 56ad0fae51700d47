//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod payer;
pub mod submission;
pub mod upload;

pub use common::*;
pub use payer::*;
pub use submission::*;
pub use upload::*;
