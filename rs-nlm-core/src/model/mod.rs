//! Character-level Markov chains and the article model built on them.
//!
//! - Alphabet and context types (`Symbol`, `Context`)
//! - Weighted sampling (`WeightedSampler`)
//! - Training (`ChainBuilder`) and the compiled, read-only chain (`CompiledChain`)
//! - Title + body orchestration (`CorpusModel`)

/// Chain alphabet: characters plus the paragraph and document sentinels.
pub mod symbol;

/// Cumulative-weight sampler with upper-bound binary search.
pub mod sampler;

/// Frequency table accumulation, with paragraph fragment carry.
pub mod builder;

/// Immutable chain and the generation walk.
pub mod chain;

/// Two-chain article model: training, generation and snapshots.
pub mod corpus_model;
