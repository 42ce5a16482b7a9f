pub mod access_code;
pub mod jwt;
pub mod password;
pub mod sentry;
