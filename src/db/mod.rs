pub mod reset_requests;
