//! HTTP layer serving articles generated by a trained `CorpusModel`.

/// Endpoints and shared application state.
pub mod api;
