//! Keyword rules that sort test cases into the security categories the
//! score cares about.
//!
//! A rule set is an ordered list of `(bucket, keywords)` rules checked
//! top-down against the lowercased full test name; the first rule with a
//! matching keyword wins. A case matching no rule lands in the rule set's
//! default bucket, or is ignored when there is none.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::extract::TestCaseResult;
use crate::results::CountPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    SqlInjection,
    Xss,
    Auth,
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub bucket: Bucket,
    pub keywords: &'static [&'static str],
}

impl Rule {
    fn matches(&self, lowered_name: &str) -> bool {
        self.keywords.iter().any(|k| lowered_name.contains(k))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub rules: &'static [Rule],
    pub default: Option<Bucket>,
}

/// Backend security suite: injection tests by name, everything else is
/// counted as authentication/authorization.
pub const SECURITY_RULES: RuleSet = RuleSet {
    rules: &[Rule {
        bucket: Bucket::SqlInjection,
        keywords: &["sql injection", "union"],
    }],
    default: Some(Bucket::Auth),
};

/// Frontend unit suite: only rendering-safety tests count, as XSS.
pub const FRONTEND_RULES: RuleSet = RuleSet {
    rules: &[Rule {
        bucket: Bucket::Xss,
        keywords: &["html", "script", "escape", "dangerous", "xss"],
    }],
    default: None,
};

impl RuleSet {
    /// Bucket for a single test name.
    pub fn classify(&self, full_name: &str) -> Option<Bucket> {
        self.matching_rule(full_name)
            .map(|rule| rule.bucket)
            .or(self.default)
    }

    fn matching_rule(&self, full_name: &str) -> Option<&Rule> {
        let lowered = full_name.to_lowercase();
        self.rules.iter().find(|rule| rule.matches(&lowered))
    }

    /// Sort every case into its bucket and tally each bucket.
    pub fn partition(&self, cases: &[TestCaseResult]) -> Partition {
        let mut tallies: BTreeMap<Bucket, CountPair> = BTreeMap::new();
        for case in cases {
            let bucket = match (self.matching_rule(&case.full_name), self.default) {
                (Some(rule), _) => rule.bucket,
                (None, Some(default)) => {
                    debug!("'{}' matched no rule, counted as {:?}", case.full_name, default);
                    default
                }
                (None, None) => continue,
            };
            let tally = tallies.entry(bucket).or_default();
            tally.total += 1;
            if case.passed() {
                tally.passed += 1;
            }
        }
        Partition { tallies }
    }
}

/// Per-bucket tallies from one `RuleSet::partition`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    tallies: BTreeMap<Bucket, CountPair>,
}

impl Partition {
    /// The bucket's tally, or `None` when no case landed in it.
    pub fn tally(&self, bucket: Bucket) -> Option<CountPair> {
        self.tallies.get(&bucket).copied().filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(full_name: &str, status: &str) -> TestCaseResult {
        TestCaseResult {
            ancestor_titles: Vec::new(),
            title: full_name.to_string(),
            full_name: full_name.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn test_security_partition() {
        let cases = vec![
            case("should prevent SQL injection in search", "passed"),
            case("should require authentication for cart access", "failed"),
        ];
        let partition = SECURITY_RULES.partition(&cases);
        assert_eq!(partition.tally(Bucket::SqlInjection), Some(CountPair::new(1, 1)));
        assert_eq!(partition.tally(Bucket::Auth), Some(CountPair::new(0, 1)));
    }

    #[test]
    fn test_union_counts_as_injection() {
        assert_eq!(
            SECURITY_RULES.classify("rejects UNION SELECT payloads"),
            Some(Bucket::SqlInjection)
        );
    }

    #[test]
    fn test_unmatched_security_case_is_auth() {
        // No auth keyword needed: the security suite is a two-way split
        assert_eq!(
            SECURITY_RULES.classify("rate limits the login endpoint"),
            Some(Bucket::Auth)
        );
    }

    #[test]
    fn test_frontend_rules() {
        assert_eq!(
            FRONTEND_RULES.classify("ProductCard escapes HTML in the description"),
            Some(Bucket::Xss)
        );
        assert_eq!(
            FRONTEND_RULES.classify("does not use dangerouslySetInnerHTML"),
            Some(Bucket::Xss)
        );
        assert_eq!(FRONTEND_RULES.classify("adds item to cart"), None);
    }

    #[test]
    fn test_empty_bucket_is_none() {
        let cases = vec![case("adds item to cart", "passed")];
        let partition = FRONTEND_RULES.partition(&cases);
        assert!(partition.tally(Bucket::Xss).is_none());

        let partition = SECURITY_RULES.partition(&[]);
        assert!(partition.tally(Bucket::SqlInjection).is_none());
        assert!(partition.tally(Bucket::Auth).is_none());
    }

    #[test]
    fn test_only_passed_status_counts() {
        let cases = vec![
            case("renders <script> as text", "passed"),
            case("escapes attributes", "pending"),
            case("strips xss vectors", "todo"),
        ];
        let partition = FRONTEND_RULES.partition(&cases);
        assert_eq!(partition.tally(Bucket::Xss), Some(CountPair::new(1, 3)));
    }
}
