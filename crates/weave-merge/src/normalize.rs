//! Actor identity normalization
//!
//! Source logs name actors however the underlying VCS recorded them. The
//! normalizer folds those raw names onto canonical handles using a static
//! rename table; names missing from the table pass through unchanged.

use std::collections::HashMap;

/// Maps raw actor names to canonical handles
#[derive(Debug, Clone, Default)]
pub struct IdentityNormalizer {
    renames: HashMap<String, String>,
}

impl IdentityNormalizer {
    /// Create a normalizer with no renames
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer from a rename table
    pub fn with_renames<K, V>(renames: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            renames: renames
                .into_iter()
                .map(|(raw, handle)| (raw.into(), handle.into()))
                .collect(),
        }
    }

    /// Canonical handle for a raw actor name
    pub fn normalize<'a>(&'a self, raw_actor: &'a str) -> &'a str {
        self.renames
            .get(raw_actor)
            .map(String::as_str)
            .unwrap_or(raw_actor)
    }

    /// Number of rename entries
    pub fn len(&self) -> usize {
        self.renames.len()
    }

    /// Check if the rename table is empty
    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renamed_actor() {
        let normalizer =
            IdentityNormalizer::with_renames([("Max Weber", "Abex"), ("Vagrant User", "deathbeam")]);
        assert_eq!(normalizer.normalize("Max Weber"), "Abex");
        assert_eq!(normalizer.normalize("Vagrant User"), "deathbeam");
    }

    #[test]
    fn test_unknown_actor_passes_through() {
        let normalizer = IdentityNormalizer::with_renames([("Max Weber", "Abex")]);
        assert_eq!(normalizer.normalize("Adam"), "Adam");
        assert_eq!(normalizer.normalize("max weber"), "max weber");
    }

    #[test]
    fn test_many_names_to_one_handle() {
        let normalizer =
            IdentityNormalizer::with_renames([("Tomas Slusny", "deathbeam"), ("Vagrant User", "deathbeam")]);
        assert_eq!(
            normalizer.normalize("Tomas Slusny"),
            normalizer.normalize("Vagrant User")
        );
        assert_eq!(normalizer.len(), 2);
    }

    #[test]
    fn test_empty_normalizer() {
        let normalizer = IdentityNormalizer::new();
        assert!(normalizer.is_empty());
        assert_eq!(normalizer.normalize("anyone"), "anyone");
    }
}
