use rustc_hash::FxHashSet;
use serde::Deserialize;

/// One named set of blockable domain suffixes.
#[derive(Debug, Clone)]
pub struct Category {
    pub key: String,
    pub label: String,
    /// Lowercased domain suffixes.
    pub domains: FxHashSet<String>,
}

/// Shape of a single entry in `categories.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDef {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub domains: Vec<String>,
}

/// The full category catalog, in file insertion order.
///
/// Order matters: classification walks categories front to back and the
/// first match wins, so the catalog must preserve the order the config
/// file declares.
#[derive(Debug, Clone, Default)]
pub struct CategoryCatalog {
    categories: Vec<Category>,
}

impl CategoryCatalog {
    pub fn new(entries: Vec<(String, CategoryDef)>) -> Self {
        let categories = entries
            .into_iter()
            .map(|(key, def)| {
                let label = def.label.unwrap_or_else(|| key.clone());
                let domains = def
                    .domains
                    .iter()
                    .map(|d| d.to_lowercase())
                    .collect::<FxHashSet<_>>();
                Category {
                    key,
                    label,
                    domains,
                }
            })
            .collect();
        Self { categories }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.key == key)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total_domains(&self) -> usize {
        self.categories.iter().map(|c| c.domains.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(label: &str, domains: &[&str]) -> CategoryDef {
        CategoryDef {
            label: Some(label.to_string()),
            domains: domains.iter().map(|d| d.to_string()).collect(),
        }
    }

    #[test]
    fn catalog_preserves_insertion_order() {
        let catalog = CategoryCatalog::new(vec![
            ("social".into(), def("Social Media", &["tiktok.com"])),
            ("ads".into(), def("Advertising", &["doubleclick.net"])),
            ("gaming".into(), def("Gaming", &["roblox.com"])),
        ]);
        let keys: Vec<&str> = catalog.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["social", "ads", "gaming"]);
    }

    #[test]
    fn domains_are_lowercased() {
        let catalog = CategoryCatalog::new(vec![("ads".into(), def("Ads", &["DoubleClick.NET"]))]);
        assert!(catalog.get("ads").unwrap().domains.contains("doubleclick.net"));
    }

    #[test]
    fn label_defaults_to_key() {
        let catalog = CategoryCatalog::new(vec![(
            "porn".into(),
            CategoryDef {
                label: None,
                domains: vec![],
            },
        )]);
        assert_eq!(catalog.get("porn").unwrap().label, "porn");
    }
}
