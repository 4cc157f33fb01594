// src/infrastructure/mod.rs
pub mod anki_connect;
pub mod collection;
pub mod config;
pub mod discovery;
pub mod file_writer;
pub mod note_file;

pub use anki_connect::AnkiConnectRepository;
pub use collection::CollectionRepository;
pub use config::{Backend, Config};
