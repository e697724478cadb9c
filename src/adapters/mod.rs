//! HTTP adapters

pub mod chat_handler;
pub mod rest_handler;
