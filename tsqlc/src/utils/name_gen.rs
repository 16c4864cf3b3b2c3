use std::collections::HashSet;

/// Hands out names that do not collide with names already in use.
///
/// Comparison is case-insensitive, since SQL Server identifiers are under the
/// default collation.
#[derive(Debug, Clone, Default)]
pub struct NameGenerator {
    taken: HashSet<String>,
}

impl NameGenerator {
    pub fn new<S: AsRef<str>, I: IntoIterator<Item = S>>(taken: I) -> Self {
        NameGenerator {
            taken: taken
                .into_iter()
                .map(|name| name.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(&name.to_lowercase())
    }

    /// Returns `base` if it is free, otherwise `base_1`, `base_2`, ...
    /// The returned name is reserved.
    pub fn gen(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 0;
        while self.is_taken(&name) {
            suffix += 1;
            name = format!("{base}_{suffix}");
        }
        if suffix > 0 {
            log::debug!("synthetic name `{base}` is in use, renamed to `{name}`");
        }
        self.taken.insert(name.to_lowercase());
        name
    }
}
