pub mod appointment_repository;
pub mod db_init;
pub mod tables;
pub mod temporal;

pub use appointment_repository::AppointmentRepositoryImpl;
pub use temporal::{TemporalRepositoryImpl, TemporalTable};
