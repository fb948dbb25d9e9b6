use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::context::RequestContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Allow,
	Redact,
	InternalOnly,
	Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
	pub action: Action,
	pub target: String,
	pub requires_redaction: bool,
	pub allow_detokenize: bool,
	pub allowed_categories: HashSet<Category>,
	pub policy_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionRouting {
	pub external_allowed: bool,
	#[serde(default)]
	pub preferred_external_targets: Vec<String>,
	pub internal_fallback: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerConstraint {
	#[serde(default)]
	pub forced_redaction: bool,
	pub category_allow_list: Option<HashSet<Category>>,
	#[serde(default)]
	pub trusted: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppliesTo {
	/// `None` applies to every region; `Some(list)` restricts to the listed
	/// regions, where the literal `"*"` entry matches any.
	pub regions: Option<Vec<String>>,
	pub callers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
	pub match_category: Option<Category>,
	pub action: Action,
	#[serde(default)]
	pub applies_to: AppliesTo,
	#[serde(default)]
	pub allow_models: Vec<String>,
	pub allow_categories: Option<HashSet<Category>>,
	#[serde(default = "default_allow_detokenize")]
	pub allow_detokenize: bool,
}

fn default_allow_detokenize() -> bool {
	true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDoc {
	pub version: String,
	#[serde(default)]
	pub restricted_regions: HashSet<String>,
	#[serde(default)]
	pub region_routing: HashMap<String, RegionRouting>,
	#[serde(default)]
	pub caller_constraints: HashMap<String, CallerConstraint>,
	pub routes: Vec<Route>,
}

fn region_matches(applies: &AppliesTo, region: &str) -> bool {
	match &applies.regions {
		None => true,
		Some(list) => list.iter().any(|r| r == "*" || r == region),
	}
}

fn caller_matches(applies: &AppliesTo, caller: &str) -> bool {
	match &applies.callers {
		None => true,
		Some(list) => list.iter().any(|c| c == "*" || c == caller),
	}
}

/// `decide(categories, context) -> Decision`. Pure function of `doc` plus
/// inputs; no I/O.
pub fn decide(doc: &PolicyDoc, categories: &HashSet<Category>, ctx: &RequestContext) -> Decision {
	let mut decision = Decision {
		action: Action::Allow,
		target: "internal:default".to_string(),
		requires_redaction: false,
		allow_detokenize: true,
		allowed_categories: [Category::Pii, Category::OpsSensitive].into_iter().collect(),
		policy_version: doc.version.clone(),
	};

	let caller_constraint = doc.caller_constraints.get(&ctx.caller);
	if caller_constraint.map(|c| c.forced_redaction).unwrap_or(false) {
		decision.requires_redaction = true;
	}

	let restricted = doc.restricted_regions.contains(&ctx.region);
	let routing_key = if restricted { "restricted" } else { ctx.region.as_str() };
	let routing = doc.region_routing.get(routing_key);

	for route in &doc.routes {
		if !region_matches(&route.applies_to, &ctx.region) {
			continue;
		}
		if !caller_matches(&route.applies_to, &ctx.caller) {
			continue;
		}
		if let Some(cat) = route.match_category {
			if !categories.contains(&cat) {
				continue;
			}
		}

		match route.action {
			Action::Block => {
				decision.action = Action::Block;
				return decision;
			}
			Action::Redact => {
				decision.action = Action::Redact;
				decision.requires_redaction = true;
				decision.allow_detokenize = route.allow_detokenize;
				decision.target = if restricted {
					routing.map(|r| r.internal_fallback.clone()).unwrap_or_default()
				} else {
					route
						.allow_models
						.first()
						.cloned()
						.or_else(|| routing.and_then(|r| r.preferred_external_targets.first().cloned()))
						.unwrap_or_default()
				};
				decision.allowed_categories = match (&route.allow_categories, caller_constraint.and_then(|c| c.category_allow_list.as_ref())) {
					(Some(route_cats), Some(caller_cats)) => route_cats.intersection(caller_cats).copied().collect(),
					(Some(route_cats), None) => route_cats.clone(),
					(None, Some(caller_cats)) => caller_cats.clone(),
					(None, None) => decision.allowed_categories.clone(),
				};
			}
			Action::InternalOnly => {
				decision.action = Action::InternalOnly;
				decision.requires_redaction = false;
				decision.allow_detokenize = false;
				decision.target = route
					.allow_models
					.first()
					.cloned()
					.or_else(|| routing.map(|r| r.internal_fallback.clone()))
					.unwrap_or_default();
			}
			Action::Allow => {}
		}

		if route.match_category.is_some() {
			return decision;
		}
	}

	decision
}

#[cfg(test)]
mod tests {
	use super::*;

	fn doc_with_secret_block() -> PolicyDoc {
		PolicyDoc {
			version: "v1".to_string(),
			restricted_regions: ["eu".to_string()].into_iter().collect(),
			region_routing: HashMap::from([
				(
					"us".to_string(),
					RegionRouting {
						external_allowed: true,
						preferred_external_targets: vec!["openai:gpt-4".to_string()],
						internal_fallback: "internal:us-default".to_string(),
					},
				),
				(
					"restricted".to_string(),
					RegionRouting {
						external_allowed: false,
						preferred_external_targets: vec![],
						internal_fallback: "internal:eu-only".to_string(),
					},
				),
			]),
			caller_constraints: HashMap::new(),
			routes: vec![
				Route {
					match_category: Some(Category::Secret),
					action: Action::Block,
					applies_to: AppliesTo::default(),
					allow_models: vec![],
					allow_categories: None,
					allow_detokenize: false,
				},
				Route {
					match_category: Some(Category::Pii),
					action: Action::Redact,
					applies_to: AppliesTo::default(),
					allow_models: vec!["openai:gpt-4-turbo".to_string()],
					allow_categories: Some([Category::Pii].into_iter().collect()),
					allow_detokenize: true,
				},
			],
		}
	}

	#[test]
	fn secret_always_blocks() {
		let doc = doc_with_secret_block();
		let ctx = RequestContext::new("incident-mgr", "us", "INC-1");
		let categories: HashSet<Category> = [Category::Secret, Category::Pii].into_iter().collect();
		let decision = decide(&doc, &categories, &ctx);
		assert_eq!(decision.action, Action::Block);
	}

	#[test]
	fn restricted_region_never_targets_external() {
		let doc = doc_with_secret_block();
		let ctx = RequestContext::new("incident-mgr", "eu", "INC-1");
		let categories: HashSet<Category> = [Category::Pii].into_iter().collect();
		let decision = decide(&doc, &categories, &ctx);
		assert_eq!(decision.action, Action::Redact);
		assert_eq!(decision.target, "internal:eu-only");
	}

	#[test]
	fn non_restricted_region_uses_route_model() {
		let doc = doc_with_secret_block();
		let ctx = RequestContext::new("incident-mgr", "us", "INC-1");
		let categories: HashSet<Category> = [Category::Pii].into_iter().collect();
		let decision = decide(&doc, &categories, &ctx);
		assert_eq!(decision.target, "openai:gpt-4-turbo");
	}

	#[test]
	fn no_matching_category_falls_through_to_default() {
		let doc = doc_with_secret_block();
		let ctx = RequestContext::new("incident-mgr", "us", "INC-1");
		let categories: HashSet<Category> = HashSet::new();
		let decision = decide(&doc, &categories, &ctx);
		assert_eq!(decision.action, Action::Allow);
		assert_eq!(decision.target, "internal:default");
	}
}
