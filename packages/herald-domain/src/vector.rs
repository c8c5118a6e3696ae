/// Magnitudes at or below this are treated as zero.
pub const EPSILON: f32 = f32::EPSILON;

pub fn l2_norm(values: &[f32]) -> f32 {
	values.iter().map(|value| f64::from(*value) * f64::from(*value)).sum::<f64>().sqrt() as f32
}

/// Rescales `values` to unit length in place. Near-zero vectors are left untouched.
pub fn normalize(values: &mut [f32]) {
	let magnitude = l2_norm(values);

	if magnitude <= EPSILON {
		return;
	}

	for value in values.iter_mut() {
		*value /= magnitude;
	}
}

/// Inner product over the shared prefix of `a` and `b`. For unit vectors this is the cosine
/// similarity.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum::<f64>() as f32
}
