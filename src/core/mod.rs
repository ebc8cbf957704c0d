pub mod app;
pub mod chat_stream;
pub mod config;
pub mod constants;
pub mod devotional;
pub mod generation;
pub mod ids;
pub mod keyring;
pub mod message;
pub mod session;
pub mod storage;
pub mod study;
pub mod text;
