//! Trusted-route restriction policy resolution.
//!
//! When enabled, peer routes are restricted to the union of a family-name
//! set and a router-ident set, both supplied as comma-separated option
//! strings. Splitting is on the literal comma only; an entry containing a
//! comma cannot be represented. That is a known format limitation.

use std::collections::BTreeSet;

use lattica_core::IdentHash;

/// Resolved restriction sets.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrustPolicy {
    pub families: BTreeSet<String>,
    pub routers: BTreeSet<IdentHash>,
}

impl TrustPolicy {
    /// True when the policy restricts to nothing at all.
    pub fn is_empty(&self) -> bool {
        self.families.is_empty() && self.routers.is_empty()
    }
}

/// Outcome of trust policy resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustOutcome {
    /// `None` when trusted routes are disabled.
    pub policy: Option<TrustPolicy>,
    /// Router entries that failed to decode; reported, never fatal.
    pub invalid_routers: Vec<String>,
}

/// Resolve the trust policy from raw option strings.
///
/// An enabled policy with both lists empty is returned as-is; the caller
/// logs the operator error but startup proceeds.
pub fn resolve_trust_policy(enabled: bool, families_csv: &str, routers_csv: &str) -> TrustOutcome {
    if !enabled {
        return TrustOutcome {
            policy: None,
            invalid_routers: Vec::new(),
        };
    }

    let families: BTreeSet<String> = split_csv(families_csv).map(str::to_string).collect();

    let mut routers = BTreeSet::new();
    let mut invalid_routers = Vec::new();
    for entry in split_csv(routers_csv) {
        match IdentHash::from_base32(entry) {
            Ok(ident) => {
                routers.insert(ident);
            }
            Err(_) => invalid_routers.push(entry.to_string()),
        }
    }

    TrustOutcome {
        policy: Some(TrustPolicy { families, routers }),
        invalid_routers,
    }
}

/// Split on literal commas, trimming whitespace and dropping empty entries.
fn split_csv(csv: &str) -> impl Iterator<Item = &str> {
    csv.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_yields_no_policy() {
        let outcome = resolve_trust_policy(false, "alpha,beta", "whatever");
        assert_eq!(outcome.policy, None);
        assert!(outcome.invalid_routers.is_empty());
    }

    #[test]
    fn families_are_split_on_commas() {
        let outcome = resolve_trust_policy(true, "alpha,beta", "");
        let policy = outcome.policy.unwrap();
        assert_eq!(
            policy.families,
            BTreeSet::from(["alpha".to_string(), "beta".to_string()])
        );
        assert!(policy.routers.is_empty());
    }

    #[test]
    fn entries_are_trimmed_and_empties_dropped() {
        let outcome = resolve_trust_policy(true, " alpha , ,beta,", "");
        let policy = outcome.policy.unwrap();
        assert_eq!(policy.families.len(), 2);
        assert!(policy.families.contains("alpha"));
        assert!(policy.families.contains("beta"));
    }

    #[test]
    fn router_idents_are_decoded() {
        let ident = IdentHash::new([0x42; 32]);
        let csv = format!("{},{}", ident.to_base32(), ident.to_base32());
        let outcome = resolve_trust_policy(true, "", &csv);
        let policy = outcome.policy.unwrap();
        assert_eq!(policy.routers, BTreeSet::from([ident]));
        assert!(outcome.invalid_routers.is_empty());
    }

    #[test]
    fn undecodable_router_entries_are_collected() {
        let ident = IdentHash::new([0x42; 32]);
        let csv = format!("not-an-ident,{}", ident.to_base32());
        let outcome = resolve_trust_policy(true, "", &csv);
        let policy = outcome.policy.unwrap();
        assert_eq!(policy.routers.len(), 1);
        assert_eq!(outcome.invalid_routers, vec!["not-an-ident".to_string()]);
    }

    #[test]
    fn enabled_with_both_empty_is_an_empty_policy() {
        let outcome = resolve_trust_policy(true, "", "");
        let policy = outcome.policy.unwrap();
        assert!(policy.is_empty());
    }

    #[test]
    fn duplicates_collapse() {
        let outcome = resolve_trust_policy(true, "alpha,alpha,alpha", "");
        assert_eq!(outcome.policy.unwrap().families.len(), 1);
    }
}
