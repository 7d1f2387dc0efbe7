//! Transitive closure over a directed acyclic relation
//!
//! Used for the supertype relation between type URIs and the
//! superproperty relation between property URIs.
//!
//! Invariants, for every value `v`:
//!
//! - `v` is never in its own forward or reverse closure
//! - `v2 ∈ fwd(v1)` exactly when `v1 ∈ rev(v2)`

use std::collections::{BTreeSet, HashMap};

use annal_core::{AnnalError, AnnalResult};

/// Direct relations plus memoised closures
#[derive(Debug, Clone, Default)]
pub struct ClosureCache {
    fwd_rel: HashMap<String, BTreeSet<String>>,
    rev_rel: HashMap<String, BTreeSet<String>>,
    fwd_memo: HashMap<String, BTreeSet<String>>,
    rev_memo: HashMap<String, BTreeSet<String>>,
}

fn closure_of(
    rel: &HashMap<String, BTreeSet<String>>,
    memo: &mut HashMap<String, BTreeSet<String>>,
    v: &str,
) -> BTreeSet<String> {
    if let Some(found) = memo.get(v) {
        return found.clone();
    }
    let mut result = BTreeSet::new();
    let mut stack: Vec<&str> = vec![v];
    while let Some(next) = stack.pop() {
        if let Some(direct) = rel.get(next) {
            for v1 in direct {
                if result.insert(v1.clone()) {
                    stack.push(v1);
                }
            }
        }
    }
    memo.insert(v.to_string(), result.clone());
    result
}

impl ClosureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no relation is defined
    pub fn is_empty(&self) -> bool {
        self.fwd_rel.is_empty()
    }

    fn invalidate(&mut self) {
        self.fwd_memo.clear();
        self.rev_memo.clear();
    }

    /// Add `v1 rel v2`.
    ///
    /// Returns `Ok(true)` if the relation is new, `Ok(false)` if it was
    /// already present, and an error (leaving the cache unchanged) if it
    /// would relate a value to itself or close a cycle.
    pub fn add_rel(&mut self, v1: &str, v2: &str) -> AnnalResult<bool> {
        if v1 == v2 {
            return Err(AnnalError::SupertypeCycle(v1.to_string()));
        }
        if self.rev_closure(v1).contains(v2) {
            return Err(AnnalError::SupertypeCycle(format!("{} -> {}", v1, v2)));
        }
        if self.fwd_rel.get(v1).is_some_and(|s| s.contains(v2)) {
            return Ok(false);
        }
        self.fwd_rel
            .entry(v1.to_string())
            .or_default()
            .insert(v2.to_string());
        self.rev_rel
            .entry(v2.to_string())
            .or_default()
            .insert(v1.to_string());
        self.invalidate();
        Ok(true)
    }

    /// Remove every direct relation that mentions `v`
    pub fn remove_val(&mut self, v: &str) -> bool {
        let mut updated = false;
        if let Some(targets) = self.fwd_rel.remove(v) {
            for v2 in targets {
                remove_direct(&mut self.rev_rel, &v2, v);
            }
            updated = true;
        }
        if let Some(sources) = self.rev_rel.remove(v) {
            for v1 in sources {
                remove_direct(&mut self.fwd_rel, &v1, v);
            }
            updated = true;
        }
        if updated {
            self.invalidate();
        }
        updated
    }

    /// Values `v1` such that `v rel+ v1`
    pub fn fwd_closure(&mut self, v: &str) -> BTreeSet<String> {
        closure_of(&self.fwd_rel, &mut self.fwd_memo, v)
    }

    /// Values `v1` such that `v1 rel+ v`
    pub fn rev_closure(&mut self, v: &str) -> BTreeSet<String> {
        closure_of(&self.rev_rel, &mut self.rev_memo, v)
    }

    /// Every value mentioned by some relation
    pub fn values(&self) -> BTreeSet<String> {
        self.fwd_rel
            .keys()
            .chain(self.rev_rel.keys())
            .cloned()
            .collect()
    }
}

fn remove_direct(rel: &mut HashMap<String, BTreeSet<String>>, v1: &str, v2: &str) {
    if let Some(set) = rel.get_mut(v1) {
        set.remove(v2);
        if set.is_empty() {
            rel.remove(v1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_chain_closure() {
        let mut c = ClosureCache::new();
        assert!(c.add_rel("C", "B").unwrap());
        assert!(c.add_rel("B", "A").unwrap());
        assert_eq!(c.fwd_closure("C"), set(&["A", "B"]));
        assert_eq!(c.rev_closure("A"), set(&["B", "C"]));
        assert_eq!(c.fwd_closure("A"), set(&[]));
    }

    #[test]
    fn test_duplicate_relation() {
        let mut c = ClosureCache::new();
        assert!(c.add_rel("B", "A").unwrap());
        assert!(!c.add_rel("B", "A").unwrap());
    }

    #[test]
    fn test_rejects_self_and_cycle() {
        let mut c = ClosureCache::new();
        assert!(c.add_rel("A", "A").is_err());
        c.add_rel("C", "B").unwrap();
        c.add_rel("B", "A").unwrap();
        assert!(c.add_rel("A", "C").is_err());
        assert_eq!(c.fwd_closure("A"), set(&[]));
    }

    #[test]
    fn test_closure_updates_after_add() {
        let mut c = ClosureCache::new();
        c.add_rel("B", "A").unwrap();
        assert_eq!(c.rev_closure("A"), set(&["B"]));
        c.add_rel("D", "B").unwrap();
        assert_eq!(c.rev_closure("A"), set(&["B", "D"]));
        assert_eq!(c.fwd_closure("D"), set(&["A", "B"]));
    }

    #[test]
    fn test_remove_val() {
        let mut c = ClosureCache::new();
        c.add_rel("C", "B").unwrap();
        c.add_rel("B", "A").unwrap();
        assert!(c.remove_val("B"));
        assert_eq!(c.fwd_closure("C"), set(&[]));
        assert!(c.values().is_empty());
        assert!(!c.remove_val("B"));
    }
}
