// Free-form options stored alongside the method environments

use super::ConfigError;
use rustc_hash::FxHashMap;
use tracing::info;

/// A named option value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsOption {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Options {
    entries: FxHashMap<String, DsOption>,
}

impl Options {
    /// All options, sorted by name
    pub fn list(&self) -> Vec<&DsOption> {
        let mut options: Vec<_> = self.entries.values().collect();
        options.sort_by(|a, b| a.name.cmp(&b.name));
        options
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Result<&DsOption, ConfigError> {
        self.entries
            .get(name)
            .ok_or_else(|| ConfigError::NoSuchOption(name.to_string()))
    }

    pub fn add_or_update(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.insert(name.into(), value.into());
    }

    /// Insert only when no option of that name exists; returns whether it did
    pub fn add_if_absent(&mut self, name: impl Into<String>, value: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.insert(name, value.into());
        true
    }

    /// Absent names are ignored
    pub fn remove(&mut self, name: &str) -> Option<DsOption> {
        let removed = self.entries.remove(name);
        if removed.is_some() {
            info!(option = name, "option removed");
        }
        removed
    }

    fn insert(&mut self, name: String, value: String) {
        info!(option = %name, "option set");
        self.entries.insert(name.clone(), DsOption { name, value });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_or_update_overwrites() {
        let mut options = Options::default();
        options.add_or_update("a", "1");
        options.add_or_update("a", "2");

        assert_eq!(options.len(), 1);
        assert_eq!(options.get("a").unwrap().value, "2");
    }

    #[test]
    fn test_add_if_absent_keeps_existing() {
        let mut options = Options::default();
        assert!(options.add_if_absent("a", "1"));
        assert!(!options.add_if_absent("a", "2"));
        assert_eq!(options.get("a").unwrap().value, "1");
    }

    #[test]
    fn test_missing_option_is_an_error() {
        let options = Options::default();
        let err = options.get("nope").unwrap_err();
        assert_eq!(err.to_string(), "nope option does not exist");
    }

    #[test]
    fn test_list_sorted() {
        let mut options = Options::default();
        options.add_or_update("z", "1");
        options.add_or_update("m", "2");

        let names: Vec<_> = options.list().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["m", "z"]);
    }
}
