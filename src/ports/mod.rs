// src/ports/mod.rs
pub mod summary;

pub use summary::SummaryPresenter;
