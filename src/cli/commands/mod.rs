pub mod admin;
pub mod config;
pub mod db;
pub mod del;
pub mod export;
pub mod init;
pub mod list;
pub mod log;
pub mod punch;
pub mod render;
pub mod show;
pub mod verify;
