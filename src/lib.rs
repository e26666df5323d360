pub mod config;
pub mod draft;
pub mod error;
pub mod models;
pub mod seed;
pub mod store;
pub mod web;

pub use crate::config::Config;
pub use draft::DraftAssistant;
pub use error::{Error, Result};
pub use store::ArticleStore;
