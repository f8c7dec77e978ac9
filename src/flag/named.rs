//! Flag sets grouped by name
//!
//! The map itself has no order, so first-request order is recorded separately
//! and drives how groups are flattened and displayed.

use crate::flag::set::FlagSet;
use std::collections::HashMap;

/// Ordered mapping from group name to flag set
#[derive(Debug, Clone, Default)]
pub struct NamedFlagSets {
    order: Vec<String>,
    flag_sets: HashMap<String, FlagSet>,
}

impl NamedFlagSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the flag set for `name`, creating it on first request
    pub fn flag_set(&mut self, name: &str) -> &mut FlagSet {
        if !self.flag_sets.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.flag_sets
            .entry(name.to_string())
            .or_insert_with(|| FlagSet::new(name))
    }

    /// Look up an existing group without creating it
    pub fn get(&self, name: &str) -> Option<&FlagSet> {
        self.flag_sets.get(name)
    }

    /// Group names in order of first request
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Flag sets in order of first request
    pub fn iter(&self) -> impl Iterator<Item = &FlagSet> {
        self.order.iter().filter_map(|name| self.flag_sets.get(name))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_same_name_returns_same_instance() {
        let mut sets = NamedFlagSets::new();
        let first: *const FlagSet = sets.flag_set("global");
        sets.flag_set("global").bool_flag("verbose", "chatty output");
        let second: *const FlagSet = sets.flag_set("global");

        assert!(ptr::eq(first, second));
        assert_eq!(sets.len(), 1);
        assert_eq!(sets.get("global").map(FlagSet::len), Some(1));
    }

    #[test]
    fn test_first_request_order_is_kept() {
        let mut sets = NamedFlagSets::new();
        sets.flag_set("misc");
        sets.flag_set("global");
        sets.flag_set("server");
        sets.flag_set("misc");

        assert_eq!(sets.order(), ["misc", "global", "server"]);
        let names: Vec<_> = sets.iter().map(FlagSet::name).collect();
        assert_eq!(names, ["misc", "global", "server"]);
    }

    #[test]
    fn test_get_does_not_allocate() {
        let sets = NamedFlagSets::new();
        assert!(sets.get("global").is_none());
        assert!(sets.is_empty());
    }
}
