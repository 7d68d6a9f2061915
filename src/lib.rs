//! Meme caption service: renders captions onto remote images and keeps a
//! small table of caption/image records.

pub mod color;
pub mod compositor;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod fonts;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod text;

use crate::compositor::ImageCompositor;
use crate::domain::{FileStorage, MemeRepository};
use std::sync::Arc;

/// AppState holds shared resources for the web server.
pub struct AppState {
    pub meme_repo: Arc<dyn MemeRepository>,
    pub file_storage: Arc<dyn FileStorage>,
    pub compositor: ImageCompositor,
    pub public_base_url: Option<String>,
}
