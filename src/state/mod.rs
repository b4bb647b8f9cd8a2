/// State management module
///
/// This module handles all persisted application state:
/// - Key-value store collaborator (store.rs)
/// - Shared data structures (data.rs)
/// - The marker list and its full-list persistence (markers.rs)
/// - User settings (settings.rs)

pub mod data;
pub mod markers;
pub mod settings;
pub mod store;
