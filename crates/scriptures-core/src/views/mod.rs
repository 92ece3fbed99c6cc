//! UI-agnostic view state
//!
//! The navigation tree, the chapter reader and the reader shell hold only
//! local view state. They read data from the [`ScriptureStore`] and return
//! the [`Request`]s they need performed; they never call the API themselves.
//!
//! [`ScriptureStore`]: crate::store::ScriptureStore
//! [`Request`]: crate::store::Request

pub mod navigation;
pub mod reader;
pub mod shell;

pub use navigation::{NavigationTree, TreeNode};
pub use reader::{ChapterReader, ChapterSelection};
pub use shell::{ReaderShell, ViewMode};
