/// Verbatim guard: the model's quote must appear byte-for-byte in the chunk it was given.
pub fn quote_is_verbatim(chunk: &str, quote: &str) -> bool {
	if quote.trim().is_empty() {
		return false;
	}

	chunk.contains(quote)
}
