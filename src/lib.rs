pub mod component;
pub mod config;
pub mod init;
pub mod library;
pub mod signal;
pub mod tools;
