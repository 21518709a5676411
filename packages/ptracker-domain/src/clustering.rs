//! Within-run duplicate clustering.
//!
//! Clusters are formed greedily around a seed: the seed is always the lowest unclustered
//! index, and a cluster holds the seed plus every unclustered item directly similar to it.
//! Similarity is not followed transitively, so with `sim(A, B)` and `sim(B, C)` above the
//! threshold but `sim(A, C)` below it, seeding at `A` yields `{A, B}` and `{C}` while seeding
//! at `B` yields `{B, A, C}`. Input order therefore decides the outcome.

use std::collections::BTreeSet;

use crate::similarity;

pub trait Clusterable {
	fn embedding(&self) -> &[f32];

	fn text(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cluster {
	pub seed: usize,
	/// Seed first, then the remaining members in ascending index order.
	pub members: Vec<usize>,
	pub representative: usize,
}

pub fn cluster<T>(items: &[T], sim_threshold: f32) -> Vec<Cluster>
where
	T: Clusterable,
{
	let mut remaining: BTreeSet<usize> = (0..items.len()).collect();
	let mut clusters = Vec::new();

	while let Some(seed) = remaining.pop_first() {
		let seed_vec = items[seed].embedding();
		let similar: Vec<usize> = remaining
			.iter()
			.copied()
			.filter(|&idx| {
				similarity::cosine_similarity(seed_vec, items[idx].embedding()) >= sim_threshold
			})
			.collect();

		for idx in &similar {
			remaining.remove(idx);
		}

		let mut members = Vec::with_capacity(similar.len() + 1);

		members.push(seed);
		members.extend(similar);

		let representative = longest_member(items, &members);

		clusters.push(Cluster { seed, members, representative });
	}

	clusters
}

/// Collapses `items` to one representative per cluster, in seed order.
pub fn representatives<T>(items: Vec<T>, sim_threshold: f32) -> Vec<T>
where
	T: Clusterable,
{
	let clusters = cluster(&items, sim_threshold);
	let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();

	clusters.into_iter().filter_map(|c| slots[c.representative].take()).collect()
}

// Ties keep the earlier member, so the seed wins among equals.
fn longest_member<T>(items: &[T], members: &[usize]) -> usize
where
	T: Clusterable,
{
	let mut best = members[0];
	let mut best_len = items[best].text().chars().count();

	for &idx in &members[1..] {
		let len = items[idx].text().chars().count();

		if len > best_len {
			best = idx;
			best_len = len;
		}
	}

	best
}
