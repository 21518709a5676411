use std::collections::HashSet;

use uuid::Uuid;

/// Appends the ids of `auto` that are not already in `explicit`, preserving first-seen order.
///
/// Links have set semantics, so re-running auto-linking against the same counterpart set
/// must not add anything new.
pub fn union_ids(explicit: &[Uuid], auto: &[Uuid]) -> Vec<Uuid> {
	let mut seen = HashSet::with_capacity(explicit.len() + auto.len());
	let mut out = Vec::with_capacity(explicit.len() + auto.len());

	for id in explicit.iter().chain(auto.iter()) {
		if seen.insert(*id) {
			out.push(*id);
		}
	}

	out
}

/// Ids of `requested` that are absent from `found`, in request order without repeats.
pub fn missing_ids(requested: &[Uuid], found: &[Uuid]) -> Vec<Uuid> {
	let found: HashSet<&Uuid> = found.iter().collect();
	let mut reported = HashSet::new();

	requested.iter().filter(|id| !found.contains(id) && reported.insert(**id)).copied().collect()
}
