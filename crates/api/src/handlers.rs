pub mod appointments;
pub mod auth;
pub mod departments;
pub mod doctors;
pub mod pharmacy;
pub mod records;
pub mod reports;
pub mod schedules;
