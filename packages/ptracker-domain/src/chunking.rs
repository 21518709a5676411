/// Overlapping character windows over a page's text.
///
/// Window `i` covers characters `[i * stride, i * stride + 2 * stride)`, clipped to the end
/// of the text, so every window after the first repeats the previous window's second half.
/// The iterator is lazy and `Clone`, so a run can restart it from the beginning.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
	text: &'a str,
	// Byte offset of every char boundary, plus `text.len()` as the final entry.
	boundaries: Vec<usize>,
	stride: usize,
	next_start: usize,
}
impl<'a> Chunks<'a> {
	pub fn new(text: &'a str, stride: usize) -> Self {
		let boundaries =
			text.char_indices().map(|(idx, _)| idx).chain(std::iter::once(text.len())).collect();

		Self { text, boundaries, stride, next_start: 0 }
	}

	fn char_len(&self) -> usize {
		self.boundaries.len() - 1
	}
}
impl<'a> Iterator for Chunks<'a> {
	type Item = Chunk<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.stride == 0 || self.next_start >= self.char_len() {
			return None;
		}

		let start = self.next_start;
		let end = start.saturating_add(self.stride.saturating_mul(2)).min(self.char_len());
		let index = start / self.stride;

		self.next_start = start.saturating_add(self.stride);

		Some(Chunk {
			index,
			start_offset: start,
			end_offset: end,
			text: &self.text[self.boundaries[start]..self.boundaries[end]],
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk<'a> {
	pub index: usize,
	/// Offsets are in characters, not bytes.
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: &'a str,
}

pub fn chunks(text: &str, extract_length: usize) -> Chunks<'_> {
	Chunks::new(text, extract_length)
}
