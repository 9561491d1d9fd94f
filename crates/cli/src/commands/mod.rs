pub mod chat;
pub mod config_cmd;
pub mod gateway;
pub mod tools;
