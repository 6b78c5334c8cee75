pub mod dashboard;
pub mod leave_request;
pub mod user;
