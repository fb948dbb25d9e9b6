/// Luhn checksum validation for credit-card-shaped digit strings. Accepts
/// only the digits; separators must already be stripped by the caller.
pub fn luhn_valid(digits: &str) -> bool {
	let digits: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
	if digits.len() < 12 {
		return false;
	}
	let mut sum = 0u32;
	let mut double = false;
	for &d in digits.iter().rev() {
		let mut d = d;
		if double {
			d *= 2;
			if d > 9 {
				d -= 9;
			}
		}
		sum += d;
		double = !double;
	}
	sum % 10 == 0
}

/// SSN area-number exclusion: first 3 digits must not be 000, 666, or in
/// the 900-999 (ITIN/unassigned) range.
pub fn ssn_area_valid(area: &str) -> bool {
	let Ok(area) = area.parse::<u32>() else {
		return false;
	};
	area != 0 && area != 666 && !(900..=999).contains(&area)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn luhn_accepts_valid_card_with_separators_stripped() {
		assert!(luhn_valid("4532015112830366"));
	}

	#[test]
	fn luhn_rejects_invalid_card() {
		assert!(!luhn_valid("4532015112830367"));
	}

	#[test]
	fn ssn_rejects_reserved_areas() {
		assert!(!ssn_area_valid("000"));
		assert!(!ssn_area_valid("666"));
		assert!(!ssn_area_valid("900"));
		assert!(!ssn_area_valid("999"));
	}

	#[test]
	fn ssn_accepts_ordinary_area() {
		assert!(ssn_area_valid("078"));
	}
}
