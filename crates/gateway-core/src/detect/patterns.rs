use once_cell::sync::Lazy;
use regex::Regex;

/// Lazily-compiled, process-wide regex singletons. Mirrors the pattern
/// registration idiom used by the category recognizers this detector is
/// grounded on: one compiled pattern per concern, built once.
pub static CREDIT_CARD: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\b(?:\d[ -]?){12,18}\d\b").unwrap());

pub static SSN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"\b(\d{3})[- ](\d{2})[- ](\d{4})\b").unwrap()
});

pub static EMAIL: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap()
});

pub static AWS_ACCESS_KEY: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\bAKIA[0-9A-Z]{16}\b").unwrap());

/// Bare 40-char base64-ish token. Deliberately not narrowed by context per
/// the "do not widen recall" note: this is intentionally false-positive
/// prone and only ever kept, never loosened.
pub static AWS_SECRET_KEY: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"[A-Za-z0-9/+=]{40}").unwrap());

pub static CONNECTION_STRING: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r#"(?i)\b(postgres(?:ql)?|mysql|mongodb|redis|amqps?)://[^\s:/@]+:[^\s:/@]+@[^\s/]+(?:/[^\s'\"]*)?"#,
	)
	.unwrap()
});

pub static GENERIC_API_KEY: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"(?i)(?:api[_-]?key|token)\s*[:=]\s*['"]?[A-Za-z0-9_\-]{16,}"#).unwrap()
});

pub static AZURE_STORAGE_KEY: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\bAccountKey=[A-Za-z0-9+/=]{86,88}\b").unwrap());

pub static AZURE_CONNECTION_STRING: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"DefaultEndpointsProtocol=https?;AccountName=[^;]+;AccountKey=[^;]+").unwrap()
});

pub static AZURE_SAS: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\?sv=\d{4}-\d{2}-\d{2}&\S*sig=[A-Za-z0-9%]+").unwrap());

pub static GCP_API_KEY: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\bAIza[0-9A-Za-z_\-]{35}\b").unwrap());

pub static GCP_OAUTH_CLIENT_ID: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"\b[0-9]+-[0-9A-Za-z_]{32}\.apps\.googleusercontent\.com\b").unwrap()
});

pub static OAUTH_BEARER: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9_\-.~+/]+=*\b").unwrap());

pub static OAUTH_TOKEN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r#"(?i)access_token['"]?\s*[:=]\s*['"]?[A-Za-z0-9_\-.~+/]{20,}"#).unwrap()
});

pub static JWT: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"\beyJ[A-Za-z0-9_\-]+\.eyJ[A-Za-z0-9_\-]+\.[A-Za-z0-9_\-]+\b").unwrap()
});

/// Matches all five PEM private-key header variants (generic plus RSA/DSA/EC
/// plain and PKCS8-encrypted) in one pattern.
pub static PEM_PRIVATE_KEY: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"-----BEGIN (?:[A-Z]+ )?PRIVATE KEY-----").unwrap()
});

pub static KUBECONFIG: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"apiVersion:\s*v1\s*\nkind:\s*Config").unwrap());

pub static KUBE_TOKEN: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"token:\s*[A-Za-z0-9_\-.]{20,}").unwrap());

pub static BASIC_AUTH_IN_URL: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\b[a-zA-Z0-9._%+-]+:[^@\s]{6,}@").unwrap());

/// Default internal-domain suffixes for `ops_sensitive/internal_hostname`.
pub const INTERNAL_HOST_SUFFIXES: &[&str] = &[".internal", ".corp", ".local"];

pub static INTERNAL_HOSTNAME: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"\b[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)+\b")
		.unwrap()
});

pub static PRIVATE_IPV4: Lazy<Regex> = Lazy::new(|| {
	Regex::new(
		r"\b(?:10\.\d{1,3}\.\d{1,3}\.\d{1,3}|172\.(?:1[6-9]|2\d|3[01])\.\d{1,3}\.\d{1,3}|192\.168\.\d{1,3}\.\d{1,3})\b",
	)
	.unwrap()
});

/// ITAR/aviation keyword lexicon for the export-control density scan.
/// Case-insensitive whole-word matches; density is the count of distinct
/// match occurrences across the text, not distinct keywords.
pub const ITAR_LEXICON: &[&str] = &[
	"itar",
	"export control",
	"export-controlled",
	"defense article",
	"technical data package",
	"usml",
	"ear99",
	"munitions list",
	"missile technology",
	"avionics",
	"flight control software",
	"night vision",
	"propulsion system",
];
