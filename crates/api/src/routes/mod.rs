pub mod accounts;
pub mod activation;
pub mod auth;
pub mod health;
pub mod password;
