use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical muscle-group name → displayed name, in definition order.
///
/// `Chest` and `Quads` appear twice. Later pairs override earlier ones, so
/// the live values are "Klatka" and "Czwórogłowy uda".
pub const MUSCLE_GROUP_PAIRS: &[(&str, &str)] = &[
    ("Back", "Plecy"),
    ("Biceps", "Biceps"),
    ("Calves", "Łydki"),
    ("Chest", "Klatka piersiowa"),
    ("Chest", "Klatka"),
    ("Core", "Core"),
    ("Forearms", "Przedramiona"),
    ("Full Body", "Całe ciało"),
    ("Glutes", "Pośladki"),
    ("Hamstrings", "Uda tylne"),
    ("Lower Back", "Dolna część pleców"),
    ("Quads", "Uda przednie"),
    ("Quads", "Czwórogłowy uda"),
    ("Rear Delts", "Tylne barki"),
    ("Shoulders", "Barki"),
    ("Anterior Tibialis", "Mięsień piszczelowy przedni"),
    ("Traps", "Kaptur"),
    ("Triceps", "Triceps"),
    ("Adductors", "Przywodziciele"),
    ("Hips", "Biodra"),
    ("Abductors", "Odwodziciele"),
];

static BUILTIN: LazyLock<MuscleGroupTable> =
    LazyLock::new(|| MuscleGroupTable::from_pairs(MUSCLE_GROUP_PAIRS.iter().copied()));

/// Read-only lookup table for muscle-group names.
#[derive(Debug, Clone, Default)]
pub struct MuscleGroupTable {
    entries: HashMap<String, String>,
}

/// What happened to one muscle-group name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingOutcome {
    /// Found in the table with a different value.
    Mapped { from: String, to: String },
    /// Found in the table, and the value equals the key.
    Unchanged(String),
    /// Not in the table; passed through as-is.
    Unmapped(String),
}

impl MappingOutcome {
    /// The name to emit.
    pub fn name(&self) -> &str {
        match self {
            MappingOutcome::Mapped { to, .. } => to,
            MappingOutcome::Unchanged(name) | MappingOutcome::Unmapped(name) => name,
        }
    }
}

impl MuscleGroupTable {
    /// Build a table from ordered pairs. When a key repeats, the last pair wins.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut entries = HashMap::new();
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Self { entries }
    }

    /// The process-wide table built from [`MUSCLE_GROUP_PAIRS`].
    pub fn builtin() -> &'static MuscleGroupTable {
        &BUILTIN
    }

    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Resolve a (trimmed) name.
    pub fn resolve(&self, name: &str) -> MappingOutcome {
        let name = name.trim();
        match self.lookup(name) {
            Some(value) if value == name => MappingOutcome::Unchanged(name.to_string()),
            Some(value) => MappingOutcome::Mapped {
                from: name.to_string(),
                to: value.to_string(),
            },
            None => MappingOutcome::Unmapped(name.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_definition_wins() {
        let table = MuscleGroupTable::builtin();
        assert_eq!(table.lookup("Chest"), Some("Klatka"));
        assert_eq!(table.lookup("Quads"), Some("Czwórogłowy uda"));
        // 21 pairs, two duplicated keys.
        assert_eq!(MUSCLE_GROUP_PAIRS.len(), 21);
        assert_eq!(table.len(), 19);
    }

    #[test]
    fn test_order_decides_duplicates() {
        let table = MuscleGroupTable::from_pairs([("k", "first"), ("k", "second")]);
        assert_eq!(table.lookup("k"), Some("second"));
        let table = MuscleGroupTable::from_pairs([("k", "second"), ("k", "first")]);
        assert_eq!(table.lookup("k"), Some("first"));
    }

    #[test]
    fn test_resolve_outcomes() {
        let table = MuscleGroupTable::builtin();
        assert_eq!(
            table.resolve("  Back "),
            MappingOutcome::Mapped {
                from: "Back".into(),
                to: "Plecy".into()
            }
        );
        assert_eq!(table.resolve("Biceps"), MappingOutcome::Unchanged("Biceps".into()));
        assert_eq!(table.resolve("Plecy"), MappingOutcome::Unmapped("Plecy".into()));
        assert_eq!(table.resolve("back").name(), "back");
    }
}
