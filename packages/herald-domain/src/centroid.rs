use crate::vector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Vector has {actual} dimensions but the centroid has {expected}.")]
pub struct DimensionMismatch {
	pub expected: usize,
	pub actual: usize,
}

/// Folds `vector` into a centroid that already summarizes `article_count` articles and returns
/// the renormalized running mean.
pub fn fold(
	centroid: &[f32],
	article_count: i32,
	vector: &[f32],
) -> Result<Vec<f32>, DimensionMismatch> {
	if centroid.len() != vector.len() {
		return Err(DimensionMismatch { expected: centroid.len(), actual: vector.len() });
	}

	let count = f64::from(article_count.max(0));
	let mut next = centroid
		.iter()
		.zip(vector)
		.map(|(current, incoming)| {
			((f64::from(*current) * count + f64::from(*incoming)) / (count + 1.0)) as f32
		})
		.collect::<Vec<_>>();

	vector::normalize(&mut next);

	Ok(next)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_mismatched_lengths() {
		let err = fold(&[1.0, 0.0], 1, &[1.0, 0.0, 0.0]).expect_err("Expected mismatch.");

		assert_eq!(err, DimensionMismatch { expected: 2, actual: 3 });
	}

	#[test]
	fn heavy_clusters_barely_move() {
		let next = fold(&[1.0, 0.0], 99, &[0.0, 1.0]).expect("Fold failed.");

		assert!(next[0] > 0.99);
		assert!((next[1] - 0.01).abs() < 1e-3);
	}
}
