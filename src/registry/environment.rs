// Per-category table of permitted methods

use super::{MethodCategory, ResolvedMethod};
use rustc_hash::FxHashMap;
use tracing::info;

/// Methods permitted for one [`MethodCategory`], keyed by bare name
#[derive(Debug, Clone)]
pub struct Environment {
    category: MethodCategory,
    methods: FxHashMap<String, ResolvedMethod>,
}

impl Environment {
    pub fn new(category: MethodCategory) -> Self {
        Self {
            category,
            methods: FxHashMap::default(),
        }
    }

    pub fn category(&self) -> MethodCategory {
        self.category
    }

    /// Add or replace a method; returns the previous entry of that name
    pub fn add_method(&mut self, method: ResolvedMethod) -> Option<ResolvedMethod> {
        info!(category = %self.category, method = method.name(), "method permitted");
        self.methods.insert(method.name().to_string(), method)
    }

    pub fn remove_method(&mut self, name: &str) -> Option<ResolvedMethod> {
        let removed = self.methods.remove(name);
        if removed.is_some() {
            info!(category = %self.category, method = name, "method removed");
        }
        removed
    }

    pub fn method(&self, name: &str) -> Option<&ResolvedMethod> {
        self.methods.get(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// All methods, sorted by name
    pub fn methods(&self) -> Vec<&ResolvedMethod> {
        let mut methods: Vec<_> = self.methods.values().collect();
        methods.sort_by(|a, b| a.name().cmp(b.name()));
        methods
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_same_name() {
        let mut env = Environment::new(MethodCategory::Aggregate);

        assert!(env
            .add_method(ResolvedMethod::packaged("tableDS", "dsBase::tableDS"))
            .is_none());
        let previous = env.add_method(ResolvedMethod::packaged("tableDS", "dsOther::tableDS"));

        assert_eq!(
            previous,
            Some(ResolvedMethod::packaged("tableDS", "dsBase::tableDS"))
        );
        assert_eq!(env.len(), 1);
        assert!(env.has_method("tableDS"));
    }

    #[test]
    fn test_methods_sorted_by_name() {
        let mut env = Environment::new(MethodCategory::Assign);
        env.add_method(ResolvedMethod::packaged("c", "base::c"));
        env.add_method(ResolvedMethod::packaged("asNumericDS", "dsBase::asNumericDS"));
        env.add_method(ResolvedMethod::script("b", "function() 1"));

        let names: Vec<_> = env.methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["asNumericDS", "b", "c"]);
    }
}
