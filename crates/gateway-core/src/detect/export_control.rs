use crate::category::Category;
use crate::detect::patterns::ITAR_LEXICON;
use crate::span::Candidate;

/// Keyword-density scan: counts ITAR/aviation lexicon occurrences across the
/// whole text, and only emits candidates when the total count is >= 2. A
/// single stray keyword is not enough to classify the text as controlled.
pub(crate) fn scan(text: &str, priority_index: usize) -> Vec<Candidate> {
	let lower = text.to_lowercase();
	let mut hits = Vec::new();
	for &kw in ITAR_LEXICON {
		let mut start = 0;
		while let Some(pos) = lower[start..].find(kw) {
			let match_start = start + pos;
			let match_end = match_start + kw.len();
			hits.push((match_start, match_end));
			start = match_end;
		}
	}

	if hits.len() < 2 {
		return Vec::new();
	}

	hits.into_iter()
		.map(|(s, e)| Candidate { category: Category::ExportControl, start: s, end: e, priority_index })
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn single_keyword_is_not_enough() {
		let cands = scan("this avionics system is neat", 0);
		assert!(cands.is_empty());
	}

	#[test]
	fn two_keywords_trigger_controlled_classification() {
		let cands = scan("this avionics system ships with a technical data package", 0);
		assert_eq!(cands.len(), 2);
		assert!(cands.iter().all(|c| c.category == Category::ExportControl));
	}
}
