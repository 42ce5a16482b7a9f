pub mod auth;
pub mod calendar;
pub mod database_validator;
pub mod intake;
pub mod schedule;
