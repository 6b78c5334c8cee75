pub mod balance;
pub mod lifecycle;
pub mod registry;
pub mod reports;
