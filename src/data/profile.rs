// profile.rs - allelic profile normalization and the in-memory labeled set

use std::collections::HashMap;

/// Sentinel allele value meaning "missing" once a raw token has been normalized.
pub const MISSING: u32 = 0;

/// Normalize one allele token per the scheme's missing-value rules.
///
/// `""`, `-`, `0`, and `N` all mean missing. A field with semicolon-separated
/// alleles uses the first, falling back to missing if that first field is
/// itself empty.
pub fn normalize_allele(raw: &str) -> Result<u32, String> {
    let first = raw.split(';').next().unwrap_or("").trim();

    if first.is_empty() || first == "-" || first == "0" || first == "N" {
        return Ok(MISSING);
    }

    first
        .parse::<u32>()
        .map_err(|_| format!("allele token '{}' is neither a known allele id nor a missing marker", raw))
}

/// Normalize a full row of raw allele tokens into a dense integer vector.
pub fn normalize_profile(raw_fields: &[&str]) -> Result<Vec<u32>, String> {
    raw_fields.iter().map(|f| normalize_allele(f)).collect()
}

/// A fixed-length hierarchical LINcode.
pub type LinCode = Vec<i64>;

pub fn format_lincode(code: &LinCode) -> String {
    code.iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("_")
}

pub fn parse_lincode(s: &str) -> Result<LinCode, String> {
    s.split('_')
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| format!("invalid lincode component '{}' in '{}'", part, s))
        })
        .collect()
}

/// One entry of the append-only labeled set: a profile and the LINcode it was assigned.
#[derive(Debug, Clone)]
pub struct LabeledEntry {
    pub id: String,
    pub profile: Vec<u32>,
    pub code: LinCode,
}

/// The in-memory labeled set: an append-only mapping from profile id to
/// (profile, LINcode). Insertion order is preserved because later codes are
/// computed relative to earlier ones.
#[derive(Debug, Default)]
pub struct LabeledSet {
    entries: Vec<LabeledEntry>,
    index: HashMap<String, usize>,
}

impl LabeledSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn entries(&self) -> &[LabeledEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&LabeledEntry> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Push a freshly derived code. Keys are unique: pushing an id twice is a
    /// caller bug (entities are created on first assignment and never mutated).
    pub fn push(&mut self, id: String, profile: Vec<u32>, code: LinCode) {
        debug_assert!(!self.index.contains_key(&id), "labeled set keys must be unique");
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(LabeledEntry { id, profile, code });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_missing_forms() {
        for tok in ["", "-", "0", "N"] {
            assert_eq!(normalize_allele(tok).unwrap(), MISSING);
        }
    }

    #[test]
    fn normalizes_known_allele() {
        assert_eq!(normalize_allele("42").unwrap(), 42);
    }

    #[test]
    fn semicolon_uses_first_field() {
        assert_eq!(normalize_allele("7;9;12").unwrap(), 7);
        assert_eq!(normalize_allele(";9").unwrap(), MISSING);
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_allele("abc").is_err());
    }

    #[test]
    fn lincode_round_trips() {
        let code = vec![0, 1, 2];
        let s = format_lincode(&code);
        assert_eq!(s, "0_1_2");
        assert_eq!(parse_lincode(&s).unwrap(), code);
    }

    #[test]
    fn labeled_set_preserves_insertion_order() {
        let mut set = LabeledSet::new();
        set.push("b".into(), vec![1], vec![0]);
        set.push("a".into(), vec![2], vec![1]);
        let ids: Vec<_> = set.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }
}
