//! # EduVate Core
//!
//! Domain logic for the EduVate authentication and account-lifecycle
//! service. This crate is free of I/O: it holds the shared models, the
//! role/authorization rules, the password policy, and the error taxonomy
//! used by the database and API layers.

pub mod errors;
pub mod models;
pub mod password;
pub mod roles;
