pub mod account;
pub mod application;
pub mod health;
pub mod users;
