use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sampler::WeightedSampler;
use super::symbol::{Context, Symbol, paragraphs};

/// Read-only Markov chain produced by [`ChainBuilder::compile`].
///
/// Maps every context seen during training to a sampler over the symbols that
/// followed it. A compiled chain is never mutated, so it can be shared between
/// threads and walked concurrently.
///
/// [`ChainBuilder::compile`]: super::builder::ChainBuilder::compile
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CompiledChain {
	order: usize,
	samplers: HashMap<Context, WeightedSampler<Symbol>>,
}

impl CompiledChain {
	pub(crate) fn new(order: usize, samplers: HashMap<Context, WeightedSampler<Symbol>>) -> Self {
		Self { order, samplers }
	}

	/// Number of symbols in each context.
	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of contexts in the chain.
	pub fn len(&self) -> usize {
		self.samplers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.samplers.is_empty()
	}

	/// Returns the sampler for an exact context, `None` if it was never trained.
	pub fn lookup(&self, context: &[Symbol]) -> Option<&WeightedSampler<Symbol>> {
		self.samplers.get(context)
	}

	/// Walks the chain from `start`.
	///
	/// At each step the sampler of the trailing `order` symbols is drawn from.
	/// `EndOfDocument` stops the walk and is not emitted; any other symbol,
	/// paragraph breaks included, is appended. At most `max_steps` symbols are
	/// drawn. The returned sequence begins with `start`.
	///
	/// A start shorter than the order, or a context that was never trained,
	/// ends the walk early.
	pub fn generate_walk<R: Rng + ?Sized>(&self, start: &[Symbol], max_steps: usize, rng: &mut R) -> Vec<Symbol> {
		let mut output = start.to_vec();
		if output.len() < self.order {
			return output;
		}

		for _ in 0..max_steps {
			let window = &output[output.len() - self.order..];
			let Some(sampler) = self.lookup(window) else {
				debug!(context = ?window, "walk reached an untrained context");
				break;
			};
			match sampler.sample(rng) {
				Symbol::EndOfDocument => break,
				next => output.push(next),
			}
		}

		output
	}

	/// Walks the chain from `start` and returns the text split into paragraphs.
	pub fn generate_text<R: Rng + ?Sized>(&self, start: &[Symbol], max_steps: usize, rng: &mut R) -> Vec<String> {
		paragraphs(&self.generate_walk(start, max_steps, rng))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::builder::ChainBuilder;
	use crate::model::symbol::to_symbols;
	use proptest::prelude::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

	fn alphabet_chain() -> CompiledChain {
		let mut builder = ChainBuilder::new(5).unwrap();
		builder.add_text(ALPHABET, Symbol::EndOfDocument);
		builder.compile()
	}

	#[test]
	fn walk_reproduces_sequences() {
		let chain = alphabet_chain();
		let mut rng = StdRng::seed_from_u64(3);

		for (seed, expected) in [("abcde", ALPHABET), ("lmnop", "lmnopqrstuvwxyz")] {
			let text = chain.generate_text(&to_symbols(seed), 50, &mut rng);
			assert_eq!(text, vec![expected.to_owned()]);
		}
	}

	#[test]
	fn walk_stops_on_document_end() {
		let chain = alphabet_chain();
		let mut rng = StdRng::seed_from_u64(3);
		let walk = chain.generate_walk(&to_symbols("abcde"), 50, &mut rng);
		assert_eq!(walk, to_symbols(ALPHABET));
		assert!(!walk.contains(&Symbol::EndOfDocument));
	}

	#[test]
	fn walk_respects_step_cap() {
		let chain = alphabet_chain();
		let mut rng = StdRng::seed_from_u64(3);
		let walk = chain.generate_walk(&to_symbols("abcde"), 3, &mut rng);
		assert_eq!(walk, to_symbols("abcdefgh"));

		let walk = chain.generate_walk(&to_symbols("abcde"), 0, &mut rng);
		assert_eq!(walk, to_symbols("abcde"));
	}

	#[test]
	fn walk_terminates_without_document_end() {
		// Every context leads back into the cycle, the end sentinel is unreachable.
		let mut builder = ChainBuilder::new(1).unwrap();
		builder.add_text("abab", Symbol::Char('a'));
		let chain = builder.compile();
		let mut rng = StdRng::seed_from_u64(11);

		let walk = chain.generate_walk(&to_symbols("a"), 10, &mut rng);
		assert_eq!(walk.len(), 11);
		assert_eq!(walk, to_symbols("abababababa"));
	}

	#[test]
	fn walk_from_short_or_unknown_start() {
		let chain = alphabet_chain();
		let mut rng = StdRng::seed_from_u64(5);
		assert_eq!(chain.generate_walk(&to_symbols("abc"), 10, &mut rng), to_symbols("abc"));
		assert_eq!(chain.generate_walk(&to_symbols("zzzzz"), 10, &mut rng), to_symbols("zzzzz"));
	}

	#[test]
	fn walk_keeps_paragraph_breaks() {
		let mut builder = ChainBuilder::new(3).unwrap();
		builder.add_text("first", Symbol::EndOfParagraph);
		builder.add_text("second", Symbol::EndOfDocument);
		let chain = builder.compile();
		let mut rng = StdRng::seed_from_u64(9);

		let text = chain.generate_text(&to_symbols("fir"), 100, &mut rng);
		assert_eq!(text, vec!["first".to_owned(), "second".to_owned()]);
	}

	proptest! {
		#[test]
		fn walk_never_exceeds_cap(text in "[ab]{4,30}", cap in 0usize..64, seed in any::<u64>()) {
			let mut builder = ChainBuilder::new(2).unwrap();
			builder.add_text(&text, Symbol::EndOfParagraph);
			builder.add_text(&text, Symbol::EndOfParagraph);
			let chain = builder.compile();
			let start = to_symbols(&text[..2]);
			let mut rng = StdRng::seed_from_u64(seed);

			let walk = chain.generate_walk(&start, cap, &mut rng);
			prop_assert!(walk.len() <= start.len() + cap);
			prop_assert!(walk.starts_with(&start));
		}
	}
}
