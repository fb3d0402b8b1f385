use rand::Rng;

use serde::{Deserialize, Serialize};


/// Immutable weighted choice over a set of items.
///
/// Built once from observed counts, a `WeightedSampler` stores the items next
/// to a running sum of their weights. Drawing picks a uniform integer in
/// `[0, total)` and locates its bucket with an upper-bound binary search, so a
/// draw is `O(log n)` and an item is chosen with probability `weight / total`.
///
/// ## Invariants
/// - `items.len() == cumulative.len()`
/// - `cumulative` is strictly increasing (zero weights are never stored)
/// - `total` is the last cumulative weight, or 0 when empty
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct WeightedSampler<T> {
	/// Items in the order their weights were accumulated.
	items: Vec<T>,
	/// `cumulative[i]` is the sum of the weights of `items[0..=i]`.
	cumulative: Vec<usize>,
	total: usize,
}

impl<T: Clone + Default> WeightedSampler<T> {
	/// Builds a sampler from `(item, weight)` pairs.
	///
	/// Pairs with a zero weight are skipped. The iteration order is kept, it does
	/// not change the distribution.
	pub fn new<I>(weights: I) -> Self
	where
		I: IntoIterator<Item = (T, usize)>,
	{
		let mut items = Vec::new();
		let mut cumulative = Vec::new();
		let mut total = 0;

		for (item, weight) in weights {
			if weight == 0 {
				continue;
			}
			total += weight;
			items.push(item);
			cumulative.push(total);
		}

		Self { items, cumulative, total }
	}

	/// Sum of all weights.
	pub fn total(&self) -> usize {
		self.total
	}

	/// Number of distinct items that can be drawn.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Iterates over `(item, weight)` pairs.
	pub fn weights(&self) -> impl Iterator<Item = (&T, usize)> {
		let mut previous = 0;
		self.items.iter().zip(&self.cumulative).map(move |(item, c)| {
			let weight = c - previous;
			previous = *c;
			(item, weight)
		})
	}

	/// Draws one item with probability proportional to its weight.
	///
	/// An empty sampler returns `T::default()`.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
		if self.total == 0 {
			return T::default();
		}
		let r = rng.random_range(0..self.total);
		self.pick(r)
	}

	/// Returns the item whose bucket contains `r`, `r` must be below `total`.
	///
	/// The bucket is the first index whose cumulative weight is strictly greater
	/// than `r`.
	fn pick(&self, r: usize) -> T {
		let idx = self.cumulative.partition_point(|&c| c <= r);
		match self.items.get(idx) {
			Some(item) => item.clone(),
			None => T::default(),
		}
	}
}
