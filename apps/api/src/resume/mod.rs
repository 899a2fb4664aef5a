// Resume domain: data model, store with undo history, completeness scoring,
// Markdown preview and the fixed enhancement tips.
// Handlers only translate HTTP to store calls; all rules live in `store`.

pub mod handlers;
pub mod history;
pub mod models;
pub mod render;
pub mod scoring;
pub mod store;
pub mod suggestions;
