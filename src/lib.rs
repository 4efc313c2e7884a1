pub mod auth;
pub mod cli;
pub mod notify;
pub mod spuro;
pub mod store;
