pub mod config;
pub mod document;
pub mod list;
pub mod parse;
pub mod verify;
