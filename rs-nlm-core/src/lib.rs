//! Character-level Markov text generation.
//!
//! This crate trains two Markov chains over a corpus of documents, one for
//! titles and one for body text, and walks them to produce new articles that
//! look like the training corpus:
//! - Count-based chain training with paragraph and document sentinels
//! - Compiled, lock-free chains safe to share between request handlers
//! - Pluggable corpus loading
//! - Binary model snapshots
//!
//! Typical use: build a `CorpusModel` once at startup, then call
//! `CorpusModel::generate` as often as needed.

/// Markov chains, samplers and the article model.
pub mod model;

/// Training documents and corpus loaders.
pub mod corpus;

/// Error type shared by the crate.
pub mod error;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use corpus::{CorpusLoader, DirectoryCorpus, Document, StaticCorpus};
pub use error::{NlmError, Result};
pub use model::corpus_model::{Article, CorpusModel, ModelConfig};
