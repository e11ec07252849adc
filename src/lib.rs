pub mod common;
pub mod configs;
pub mod library;
pub mod protocol;
pub mod search;
pub mod sources;
