use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A verified origin plus the display metadata shown next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustedDomain {
	pub hostname: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub icon: Option<String>,
}

impl TrustedDomain {
	pub fn new(hostname: impl Into<String>) -> Self {
		Self {
			hostname: hostname.into(),
			icon: None,
		}
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}
}

/// Outcome of classifying a request origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
	Verified(&'a TrustedDomain),
	Unverified,
}

impl Verdict<'_> {
	pub fn is_verified(&self) -> bool {
		matches!(self, Self::Verified(_))
	}
}

/// The set of verified request origins.
///
/// Matching is exact: `App.example`, `https://app.example` and
/// `app.example:443` are all distinct from `app.example`.
#[derive(Debug, Clone, Default)]
pub struct DomainTrust {
	domains: BTreeMap<String, TrustedDomain>,
}

impl DomainTrust {
	pub fn new<I>(entries: I) -> Self
	where
		I: IntoIterator<Item = TrustedDomain>,
	{
		let domains = entries
			.into_iter()
			.map(|d| (d.hostname.clone(), d))
			.collect();
		Self { domains }
	}

	pub fn is_verified(&self, hostname: &str) -> bool {
		self.domains.contains_key(hostname)
	}

	pub fn check(&self, hostname: &str) -> Verdict<'_> {
		match self.domains.get(hostname) {
			Some(d) => Verdict::Verified(d),
			None => Verdict::Unverified,
		}
	}

	/// Add or replace an entry.  Returns the previous one, if any.
	pub fn insert(&mut self, domain: TrustedDomain) -> Option<TrustedDomain> {
		self.domains.insert(domain.hostname.clone(), domain)
	}

	pub fn remove(&mut self, hostname: &str) -> Option<TrustedDomain> {
		self.domains.remove(hostname)
	}

	/// Entries in hostname order.
	pub fn iter(&self) -> impl Iterator<Item = &TrustedDomain> {
		self.domains.values()
	}

	pub fn len(&self) -> usize {
		self.domains.len()
	}

	pub fn is_empty(&self) -> bool {
		self.domains.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn seeded() -> DomainTrust {
		DomainTrust::new([
			TrustedDomain::new("known.example").with_icon("https://known.example/icon.png"),
			TrustedDomain::new("dex.example"),
		])
	}

	#[test]
	fn membership() {
		let trust = seeded();
		assert!(trust.is_verified("known.example"));
		assert!(trust.is_verified("dex.example"));
		assert!(!trust.is_verified("evil.example"));
		assert!(!trust.is_verified(""));
	}

	#[test]
	fn no_normalization() {
		let trust = seeded();
		assert!(!trust.is_verified("Known.Example"));
		assert!(!trust.is_verified("https://known.example"));
		assert!(!trust.is_verified("known.example:443"));
		assert!(!trust.is_verified("known.example."));
		assert!(!trust.is_verified("sub.known.example"));
	}

	#[test]
	fn verdict_carries_icon() {
		let trust = seeded();
		match trust.check("known.example") {
			Verdict::Verified(d) => {
				assert_eq!(d.icon.as_deref(), Some("https://known.example/icon.png"))
			}
			Verdict::Unverified => panic!("expected verified"),
		}
		assert!(!trust.check("other.example").is_verified());
	}

	#[test]
	fn insert_and_remove() {
		let mut trust = DomainTrust::default();
		assert!(trust.is_empty());

		assert!(trust.insert(TrustedDomain::new("b.example")).is_none());
		assert!(trust.insert(TrustedDomain::new("a.example")).is_none());
		let prev = trust.insert(TrustedDomain::new("b.example").with_icon("b.png"));
		assert!(prev.is_some_and(|d| d.icon.is_none()));

		let hosts: Vec<_> = trust.iter().map(|d| d.hostname.as_str()).collect();
		assert_eq!(hosts, ["a.example", "b.example"]);

		assert!(trust.remove("a.example").is_some());
		assert!(!trust.is_verified("a.example"));
		assert_eq!(trust.len(), 1);
	}
}
