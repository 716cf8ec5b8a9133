pub mod rest;

use std::sync::Arc;

use crate::albums::AlbumStore;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub albums: Arc<AlbumStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(albums: AlbumStore, config: Config) -> Self {
        Self {
            albums: Arc::new(albums),
            config,
        }
    }
}
