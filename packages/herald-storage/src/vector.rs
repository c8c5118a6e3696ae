//! pgvector text literals.
//!
//! Centroids are rewritten on every merge, so they are written with enough significant digits
//! that a read-modify-write cycle does not drift.

use crate::{Error, Result};

pub const SIGNIFICANT_DIGITS: usize = 12;

pub fn to_pg_literal(vec: &[f32]) -> Result<String> {
	if vec.is_empty() {
		return Err(Error::InvalidArgument("Vector is empty.".to_string()));
	}

	let mut out = String::with_capacity(vec.len() * 16);

	out.push('[');

	for (idx, value) in vec.iter().enumerate() {
		if !value.is_finite() {
			return Err(Error::InvalidArgument(format!(
				"Vector value at index {idx} is not finite."
			)));
		}
		if idx > 0 {
			out.push(',');
		}

		out.push_str(&format_significant(f64::from(*value), SIGNIFICANT_DIGITS));
	}

	out.push(']');

	Ok(out)
}

pub fn parse_pg_literal(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let body = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')).ok_or_else(|| {
		Error::InvalidArgument("Vector text is not bracketed.".to_string())
	})?;

	if body.trim().is_empty() {
		return Ok(Vec::new());
	}

	body.split(',')
		.map(|part| {
			part.trim().parse::<f32>().map_err(|_| {
				Error::InvalidArgument(format!(
					"Vector text contains a non-numeric value {part:?}."
				))
			})
		})
		.collect()
}

/// Formats `value` with at most `digits` significant digits, switching to exponent notation for
/// very small or very large magnitudes. Trailing zeros are dropped.
pub fn format_significant(value: f64, digits: usize) -> String {
	if value == 0.0 {
		return "0".to_string();
	}

	let digits = digits.max(1);
	let exponent = value.abs().log10().floor() as i32;

	if exponent < -5 || exponent >= digits as i32 {
		let formatted = format!("{value:.prec$e}", prec = digits - 1);

		if let Some((mantissa, exp)) = formatted.split_once('e') {
			return format!("{}e{exp}", trim_fraction(mantissa));
		}

		return formatted;
	}

	let decimals = (digits as i32 - 1 - exponent).max(0) as usize;

	trim_fraction(&format!("{value:.prec$}", prec = decimals)).to_string()
}

fn trim_fraction(text: &str) -> &str {
	if !text.contains('.') {
		return text;
	}

	text.trim_end_matches('0').trim_end_matches('.')
}
