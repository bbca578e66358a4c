//! Policy Binder: deterministic hashing of a policy's visible/hidden
//! partition, for binding into a signed token.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::record::Policy;

/// SHA-256 over the canonical JSON form `{"visible": sorted, "hidden": sorted}`.
/// Always the full 64-hex-char digest (source issue #3, §9: the reference
/// truncates this to 32 chars, weakening the binding).
pub fn policy_hash(policy: &Policy) -> String {
    let mut visible: Vec<&str> = policy.visible.iter().map(String::as_str).collect();
    let mut hidden: Vec<&str> = policy.hidden.iter().map(String::as_str).collect();
    visible.sort_unstable();
    hidden.sort_unstable();

    #[derive(Serialize)]
    struct Canonical<'a> {
        visible: Vec<&'a str>,
        hidden: Vec<&'a str>,
    }

    let canonical = Canonical { visible, hidden };
    let bytes = serde_json::to_vec(&canonical).expect("canonical policy form is always valid json");
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_order_independent_and_full_width() {
        let p1 = Policy::new("id-renewal", vec!["b".into(), "a".into()], vec!["c".into()], vec![]);
        let p2 = Policy::new("id-renewal", vec!["a".into(), "b".into()], vec!["c".into()], vec![]);
        assert_eq!(policy_hash(&p1), policy_hash(&p2));
        assert_eq!(policy_hash(&p1).len(), 64);
    }

    #[test]
    fn changes_with_partition() {
        let p1 = Policy::new("p", vec!["a".into()], vec!["b".into()], vec![]);
        let p2 = Policy::new("p", vec!["a".into(), "b".into()], vec![], vec![]);
        assert_ne!(policy_hash(&p1), policy_hash(&p2));
    }

    #[test]
    fn ignores_policy_id_and_actions() {
        let p1 = Policy::new("a", vec!["x".into()], vec![], vec!["view".into()]);
        let p2 = Policy::new("b", vec!["x".into()], vec![], vec!["view".into(), "download".into()]);
        assert_eq!(policy_hash(&p1), policy_hash(&p2));
    }
}
