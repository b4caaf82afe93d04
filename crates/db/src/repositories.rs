pub mod appointment;
pub mod department;
pub mod doctor;
pub mod inventory;
pub mod medicine;
pub mod patient;
pub mod prescription;
pub mod record;
pub mod report;
pub mod schedule;
pub mod supplier;
pub mod template;
pub mod user;
