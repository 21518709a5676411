/// Cosine similarity of two L2-normalized vectors, which reduces to a dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
	1.0 - cosine_similarity(a, b)
}

/// Scales `vec` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(vec: &mut [f32]) {
	let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();

	if norm == 0.0 || !norm.is_finite() {
		return;
	}

	for value in vec.iter_mut() {
		*value /= norm;
	}
}
