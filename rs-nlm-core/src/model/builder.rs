use std::collections::HashMap;

use super::chain::CompiledChain;
use super::sampler::WeightedSampler;
use super::symbol::{Context, Symbol, to_symbols};
use crate::error::{NlmError, Result};

/// Accumulates context → next-symbol counts for a chain of order `n`.
///
/// The builder is fed one text at a time. Every window of `n` consecutive
/// symbols becomes a context and the symbol right after it is counted. The last
/// window of a text is counted as moving to the text's end sentinel.
///
/// Successive calls belong to the same document: the tail of the previous
/// call, followed by its sentinel, is kept as a fragment and prepended to the
/// next text. Feeding paragraphs one by one therefore yields the same table as
/// feeding the whole document at once with the sentinels spliced in between.
/// An `EndOfDocument` sentinel closes the document and drops the fragment.
///
/// # Invariants
/// - `order >= 1`
/// - Every key of `table` has exactly `order` symbols
/// - Every stored count is >= 1, counts only ever grow
/// - `fragment.len() <= order`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainBuilder {
	order: usize,
	table: HashMap<Context, HashMap<Symbol, usize>>,
	fragment: Vec<Symbol>,
}

impl ChainBuilder {
	/// Creates an empty builder for contexts of `order` symbols.
	///
	/// # Errors
	/// Returns `InvalidOrder` if `order` is 0.
	pub fn new(order: usize) -> Result<Self> {
		if order == 0 {
			return Err(NlmError::InvalidOrder(order));
		}
		Ok(Self { order, table: HashMap::new(), fragment: Vec::new() })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	/// Number of distinct contexts recorded so far.
	pub fn len(&self) -> usize {
		self.table.len()
	}

	pub fn is_empty(&self) -> bool {
		self.table.is_empty()
	}

	/// Counts recorded after `context`, if it was ever seen.
	pub fn counts(&self, context: &[Symbol]) -> Option<&HashMap<Symbol, usize>> {
		self.table.get(context)
	}

	/// Iterates over every recorded context and its counts.
	pub fn contexts(&self) -> impl Iterator<Item = (&Context, &HashMap<Symbol, usize>)> {
		self.table.iter()
	}

	/// Adds `text` terminated by `end`.
	///
	/// Texts shorter than the order only feed the fragment.
	pub fn add_text(&mut self, text: &str, end: Symbol) {
		self.add_symbols(&to_symbols(text), end);
	}

	/// Adds a symbol sequence terminated by `end`.
	pub fn add_symbols(&mut self, symbols: &[Symbol], end: Symbol) {
		let mut sequence = std::mem::take(&mut self.fragment);
		sequence.extend_from_slice(symbols);

		// The fragment holds at most `order` symbols, so the follower of the
		// first window always lies in the new text (or is `end`).
		if sequence.len() >= self.order {
			for i in 0..=sequence.len() - self.order {
				let context = &sequence[i..i + self.order];
				let next = sequence.get(i + self.order).copied().unwrap_or(end);
				self.record(context, next);
			}
		}

		if end != Symbol::EndOfDocument {
			let start = sequence.len() - sequence.len().min(self.order - 1);
			sequence.drain(..start);
			sequence.push(end);
			self.fragment = sequence;
		}
	}

	/// Records one observation of `next` following `context`.
	fn record(&mut self, context: &[Symbol], next: Symbol) {
		match self.table.get_mut(context) {
			Some(counts) => *counts.entry(next).or_insert(0) += 1,
			None => {
				self.table.insert(context.to_vec(), HashMap::from([(next, 1)]));
			}
		}
	}

	/// Merges the counts of another builder into this one.
	///
	/// Used to combine builders trained on disjoint sets of documents. The
	/// fragment of `other` is ignored: both builders should be between
	/// documents.
	///
	/// # Errors
	/// Returns `OrderMismatch` if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(NlmError::OrderMismatch { expected: self.order, got: other.order });
		}

		for (context, counts) in &other.table {
			let entry = self.table.entry(context.clone()).or_default();
			for (next, count) in counts {
				*entry.entry(*next).or_insert(0) += *count;
			}
		}

		Ok(())
	}

	/// Compiles the table into an immutable chain.
	///
	/// Symbols are laid out in sorted order so that the same table always
	/// compiles to the same chain. The builder is left untouched.
	pub fn compile(&self) -> CompiledChain {
		let samplers = self
			.table
			.iter()
			.map(|(context, counts)| {
				let mut weights: Vec<(Symbol, usize)> = counts.iter().map(|(s, c)| (*s, *c)).collect();
				weights.sort_unstable();
				(context.clone(), WeightedSampler::new(weights))
			})
			.collect();

		CompiledChain::new(self.order, samplers)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn ctx(s: &str) -> Context {
		to_symbols(s)
	}

	#[test]
	fn rejects_order_zero() {
		assert!(matches!(ChainBuilder::new(0), Err(NlmError::InvalidOrder(0))));
	}

	#[test]
	fn records_windows_and_end() {
		let mut builder = ChainBuilder::new(2).unwrap();
		builder.add_text("abab", Symbol::EndOfDocument);

		assert_eq!(builder.len(), 2);
		assert_eq!(builder.counts(&ctx("ab")), Some(&HashMap::from([(Symbol::Char('a'), 1), (Symbol::EndOfDocument, 1)])));
		assert_eq!(builder.counts(&ctx("ba")), Some(&HashMap::from([(Symbol::Char('b'), 1)])));
	}

	#[test]
	fn short_text_adds_nothing() {
		let mut builder = ChainBuilder::new(5).unwrap();
		builder.add_text("abc", Symbol::EndOfDocument);
		builder.add_text("", Symbol::EndOfDocument);
		assert!(builder.is_empty());
	}

	#[test]
	fn text_of_exact_order_ends() {
		let mut builder = ChainBuilder::new(3).unwrap();
		builder.add_text("abc", Symbol::EndOfDocument);
		assert_eq!(builder.counts(&ctx("abc")), Some(&HashMap::from([(Symbol::EndOfDocument, 1)])));
	}

	#[test]
	fn fragment_spans_paragraph_boundary() {
		let mut builder = ChainBuilder::new(3).unwrap();
		builder.add_text("abcd", Symbol::EndOfParagraph);
		builder.add_text("efg", Symbol::EndOfDocument);

		let mut boundary = ctx("cd");
		boundary.push(Symbol::EndOfParagraph);
		assert_eq!(builder.counts(&boundary), Some(&HashMap::from([(Symbol::Char('e'), 1)])));
		assert_eq!(builder.counts(&ctx("bcd")), Some(&HashMap::from([(Symbol::EndOfParagraph, 1)])));
	}

	#[test]
	fn document_end_clears_fragment() {
		let mut builder = ChainBuilder::new(2).unwrap();
		builder.add_text("ab", Symbol::EndOfDocument);
		builder.add_text("cd", Symbol::EndOfDocument);

		assert_eq!(builder.len(), 2);
		assert!(builder.contexts().all(|(c, _)| !c.contains(&Symbol::EndOfDocument)));
	}

	#[test]
	fn two_calls_equal_one_concatenated_call() {
		let mut split = ChainBuilder::new(5).unwrap();
		split.add_text("the quick brown fox", Symbol::EndOfParagraph);
		split.add_text("jumps over the lazy dog", Symbol::EndOfDocument);

		let mut joined_symbols = to_symbols("the quick brown fox");
		joined_symbols.push(Symbol::EndOfParagraph);
		joined_symbols.extend(to_symbols("jumps over the lazy dog"));
		let mut joined = ChainBuilder::new(5).unwrap();
		joined.add_symbols(&joined_symbols, Symbol::EndOfDocument);

		assert_eq!(split, joined);
	}

	#[test]
	fn order_one_carries_only_the_sentinel() {
		let mut builder = ChainBuilder::new(1).unwrap();
		builder.add_text("ab", Symbol::EndOfParagraph);
		builder.add_text("c", Symbol::EndOfDocument);

		assert_eq!(builder.counts(&[Symbol::EndOfParagraph]), Some(&HashMap::from([(Symbol::Char('c'), 1)])));
		assert_eq!(builder.counts(&ctx("b")), Some(&HashMap::from([(Symbol::EndOfParagraph, 1)])));
		assert_eq!(builder.counts(&ctx("c")), Some(&HashMap::from([(Symbol::EndOfDocument, 1)])));
	}

	#[test]
	fn compiled_totals_match_counts() {
		let mut builder = ChainBuilder::new(2).unwrap();
		builder.add_text("mississippi", Symbol::EndOfParagraph);
		builder.add_text("missouri", Symbol::EndOfDocument);
		let chain = builder.compile();

		assert_eq!(chain.len(), builder.len());
		for (context, counts) in builder.contexts() {
			let sampler = chain.lookup(context).expect("context compiled");
			assert_eq!(sampler.total(), counts.values().sum::<usize>());
			assert_eq!(sampler.len(), counts.len());
		}
	}

	#[test]
	fn compile_is_deterministic_and_detached() {
		let mut builder = ChainBuilder::new(2).unwrap();
		builder.add_text("banana bandana", Symbol::EndOfDocument);
		let first = builder.compile();
		assert_eq!(first, builder.compile());

		builder.add_text("cabana", Symbol::EndOfDocument);
		assert!(first.lookup(&ctx("ca")).is_none());
		assert_ne!(first, builder.compile());
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = ChainBuilder::new(2).unwrap();
		left.add_text("aab", Symbol::EndOfDocument);
		let mut right = ChainBuilder::new(2).unwrap();
		right.add_text("aab", Symbol::EndOfDocument);
		right.add_text("aac", Symbol::EndOfDocument);

		left.merge(&right).unwrap();
		assert_eq!(
			left.counts(&ctx("aa")),
			Some(&HashMap::from([(Symbol::Char('b'), 2), (Symbol::Char('c'), 1)]))
		);

		let other = ChainBuilder::new(3).unwrap();
		assert!(matches!(left.merge(&other), Err(NlmError::OrderMismatch { expected: 2, got: 3 })));
	}

	proptest! {
		#[test]
		fn paragraph_calls_match_single_call(
			order in 1usize..5,
			texts in proptest::collection::vec("[a-c]{0,8}", 1..6),
		) {
			let mut split = ChainBuilder::new(order).unwrap();
			let mut joined_symbols = Vec::new();
			for (i, text) in texts.iter().enumerate() {
				let last = i + 1 == texts.len();
				let end = if last { Symbol::EndOfDocument } else { Symbol::EndOfParagraph };
				split.add_text(text, end);

				joined_symbols.extend(to_symbols(text));
				if !last {
					joined_symbols.push(Symbol::EndOfParagraph);
				}
			}

			let mut joined = ChainBuilder::new(order).unwrap();
			joined.add_symbols(&joined_symbols, Symbol::EndOfDocument);

			prop_assert_eq!(split, joined);
		}

		#[test]
		fn contexts_have_exact_order(order in 1usize..6, text in "[a-e ]{0,40}") {
			let mut builder = ChainBuilder::new(order).unwrap();
			builder.add_text(&text, Symbol::EndOfParagraph);
			builder.add_text(&text, Symbol::EndOfDocument);
			for (context, counts) in builder.contexts() {
				prop_assert_eq!(context.len(), order);
				prop_assert!(counts.values().all(|c| *c >= 1));
			}
		}
	}
}
