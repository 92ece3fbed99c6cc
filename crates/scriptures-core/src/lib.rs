pub mod api;
pub mod config;
pub mod error;
pub mod highlight;
pub mod models;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::{HttpScriptureApi, ScriptureApi};
pub use config::Config;
pub use error::{ApiError, ErrorKind};
pub use highlight::{highlight, Highlighter, Segment};
pub use models::{
    Book, Chapter, Health, Scripture, ScriptureResponse, ScriptureSearch, Verse, Volume,
    VolumeCount,
};
pub use store::{perform, Request, Response, ScriptureStore, Ticket};
pub use views::{ChapterReader, ChapterSelection, NavigationTree, ReaderShell, TreeNode, ViewMode};
