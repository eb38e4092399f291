//! Crossfeed Core - two-axis feed navigation and media preloading
//!
//! This crate provides the building blocks of a short-form video feed that
//! moves vertically through series episodes and horizontally through
//! alternate perspectives: catalog indexing, neighbor resolution, a bounded
//! media preload cache, playback control and the navigation state machine.

pub mod adjacency;
pub mod catalog;
pub mod config;
pub mod input;
pub mod media;
pub mod navigation;
pub mod playback;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use adjacency::{Direction, NeighborSet, resolve_neighbors};
pub use catalog::{CatalogError, CatalogIndex, ContentId, ContentItem, SeriesId};
pub use config::CrossfeedConfig;
pub use input::InputAction;
pub use media::{MediaBackend, MediaCache, MediaElement, MediaError};
pub use navigation::{NavigationError, NavigatorHandle, spawn_navigator};
pub use playback::{PlaybackController, PlaybackState};

/// Core errors that can bubble up from any Crossfeed subsystem.
#[derive(Debug, thiserror::Error)]
pub enum CrossfeedError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrossfeedError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            CrossfeedError::Catalog(e) => match e {
                CatalogError::NotFound { id } => format!("No item with id {id} in the catalog"),
                CatalogError::InvalidCatalog { reason } => format!("Invalid catalog: {reason}"),
                CatalogError::Parse(_) => "Catalog is not valid JSON".to_string(),
                CatalogError::Io(_) => "Catalog file could not be read".to_string(),
            },
            CrossfeedError::Media(MediaError::LoadFailed { source_url, .. }) => {
                format!("Could not load media from {source_url}")
            }
            CrossfeedError::Media(_) => "Playback error occurred".to_string(),
            CrossfeedError::Navigation(NavigationError::UnknownItem { id }) => {
                format!("Cannot start at unknown item {id}")
            }
            CrossfeedError::Navigation(NavigationError::EngineShutdown) => {
                "Viewing session has ended".to_string()
            }
            CrossfeedError::Configuration { .. } => "Configuration error occurred".to_string(),
            CrossfeedError::Io(_) => "File system error occurred".to_string(),
        }
    }

    /// Checks if this error is due to user input validation.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CrossfeedError::Configuration { .. }
                | CrossfeedError::Catalog(
                    CatalogError::NotFound { .. }
                        | CatalogError::InvalidCatalog { .. }
                        | CatalogError::Parse(_)
                )
                | CrossfeedError::Navigation(NavigationError::UnknownItem { .. })
        )
    }
}

pub type Result<T> = std::result::Result<T, CrossfeedError>;
