pub mod access_credential;
pub mod admin_user;
pub mod customer;
pub mod document;
pub mod professional;
pub mod project;
pub mod schedule_event;

#[cfg(test)]
pub(crate) mod fixtures;
