pub mod reset_request;

pub use reset_request::{NewResetRequest, ResetRequest};
