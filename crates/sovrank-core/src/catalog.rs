//! Brand-name canonicalization.
//!
//! Maps arbitrary spellings of a brand ("LIVING PROOF", "living-proof",
//! "缕灵") onto one canonical identity through a mutable synonym table:
//! exact lookup first, then a fuzzy pass over table keys, then a
//! deterministic title-case fallback so every non-blank input resolves to
//! something presentable.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use similar::TextDiff;
use thiserror::Error;

use crate::config::{AnalysisConfig, DEFAULT_FUZZY_THRESHOLD};

/// Variant → canonical pairs compiled into every seeded catalog.
///
/// Variant keys are lowercase. Chinese aliases resolve to the same canonical
/// identities as their western spellings.
const SYNONYM_SEED: &[(&str, &str)] = &[
    ("living proof", "Living Proof"),
    ("offrelax", "Off&Relax"),
    ("fanbeauty", "Fan Beauty"),
    ("fan beauty", "Fan Beauty"),
    ("kérastase", "Kérastase"),
    ("kerastase", "Kérastase"),
    ("christophe robin", "Christophe Robin"),
    ("rene furterer", "René Furterer"),
    ("my.organics", "MY.ORGANICS"),
    // Chinese aliases
    ("缕灵", "Living Proof"),
    ("卡诗", "Kérastase"),
    ("欧莱雅", "L'Oréal"),
    ("资生堂", "Shiseido"),
    ("科颜氏", "Kiehl's"),
    ("潘婷", "Pantene"),
    ("海飞丝", "Head & Shoulders"),
    ("多芬", "Dove"),
    ("力士", "Lux"),
    ("清扬", "Clear"),
];

// Everything except word characters, whitespace, '&', apostrophe, hyphen.
static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s&'-]").expect("valid regex"));
static WS_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read synonyms file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse synonyms file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid synonym catalog: {0}")]
    Validation(String),
}

/// One canonical identity and the variant spellings that resolve to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// On-disk shape of a curated synonym catalog.
#[derive(Debug, Serialize, Deserialize)]
pub struct SynonymsFile {
    pub synonyms: Vec<SynonymEntry>,
}

#[derive(Debug, Clone)]
struct Mapping {
    variant: String,
    canonical: String,
}

/// Mutable synonym table mapping brand-name variants to canonical identities.
///
/// Lookups take `&self` and mutation takes `&mut self`, so a catalog shared
/// across worker threads behind `Arc` is read-only by construction; hosts
/// that extend the table mid-run must hold exclusive access. Within one
/// aggregation run the table is append-only.
#[derive(Debug, Clone)]
pub struct BrandCatalog {
    mappings: Vec<Mapping>,
    index: HashMap<String, usize>,
    fuzzy_threshold: f64,
}

impl BrandCatalog {
    /// Seeded catalog with the compiled-in synonym table and the default
    /// fuzzy threshold.
    #[must_use]
    pub fn new() -> Self {
        Self::seeded(DEFAULT_FUZZY_THRESHOLD)
    }

    /// Seeded catalog using the configured fuzzy threshold.
    #[must_use]
    pub fn with_config(config: &AnalysisConfig) -> Self {
        Self::seeded(config.fuzzy_threshold)
    }

    /// Catalog with no seed entries; every lookup falls through to the
    /// formatting fallback until synonyms are added.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            mappings: Vec::new(),
            index: HashMap::new(),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    fn seeded(fuzzy_threshold: f64) -> Self {
        let mut catalog = Self {
            mappings: Vec::new(),
            index: HashMap::new(),
            fuzzy_threshold,
        };
        for &(variant, canonical) in SYNONYM_SEED {
            catalog.insert_mapping(variant.to_string(), canonical);
        }
        catalog
    }

    /// Number of variant mappings in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Resolve one raw brand name to its canonical identity.
    ///
    /// Steps, first hit wins:
    /// 1. clean the surface form (strip punctuation except `&`/`'`/`-`,
    ///    collapse whitespace);
    /// 2. exact table lookup on the cleaned form, then its lowercase,
    ///    uppercase, and title-case forms;
    /// 3. fuzzy pass over table keys in insertion order, accepting the best
    ///    ratio strictly above the threshold (first key wins ties);
    /// 4. deterministic title-case fallback.
    ///
    /// Blank input (or input that cleans to nothing) returns an empty
    /// string; [`BrandCatalog::normalize_list`] filters those out.
    #[must_use]
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean_surface(raw);
        if cleaned.is_empty() {
            return cleaned;
        }

        if let Some(canonical) = self.exact_lookup(&cleaned) {
            return canonical.to_string();
        }

        let cleaned_lower = cleaned.to_lowercase();
        if let Some(canonical) = self.fuzzy_lookup(&cleaned_lower) {
            return canonical.to_string();
        }

        fallback_identity(&cleaned)
    }

    /// Normalize a list of raw names, dropping blanks and de-duplicating
    /// case-insensitively while preserving first-seen order.
    #[must_use]
    pub fn normalize_list(&self, raw_names: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for raw in raw_names {
            let canonical = self.normalize(raw);
            if canonical.is_empty() {
                continue;
            }
            if seen.insert(canonical.to_lowercase()) {
                out.push(canonical);
            }
        }
        out
    }

    /// Register a canonical identity and its variant spellings.
    ///
    /// Variants are stored lowercase, as is the canonical's own lowercase
    /// form, so re-normalizing a canonical name resolves without a fuzzy
    /// hop. A variant already claimed by a different canonical is remapped
    /// with a warning.
    pub fn add_synonyms(&mut self, canonical: &str, variants: &[String]) {
        self.insert_mapping(canonical.to_lowercase(), canonical);
        for variant in variants {
            self.insert_mapping(variant.to_lowercase(), canonical);
        }
    }

    /// Merge entries from a synonyms file into the catalog.
    pub fn import(&mut self, file: &SynonymsFile) {
        for entry in &file.synonyms {
            self.add_synonyms(&entry.canonical, &entry.variants);
        }
        tracing::info!(
            entries = file.synonyms.len(),
            mappings = self.len(),
            "synonym catalog imported"
        );
    }

    /// Snapshot the live table grouped by canonical identity, in
    /// first-registration order, for export/persistence.
    #[must_use]
    pub fn to_entries(&self) -> Vec<SynonymEntry> {
        let mut order: Vec<&str> = Vec::new();
        let mut grouped: HashMap<&str, Vec<String>> = HashMap::new();
        for mapping in &self.mappings {
            if !grouped.contains_key(mapping.canonical.as_str()) {
                order.push(mapping.canonical.as_str());
            }
            grouped
                .entry(mapping.canonical.as_str())
                .or_default()
                .push(mapping.variant.clone());
        }
        order
            .into_iter()
            .map(|canonical| SynonymEntry {
                canonical: canonical.to_string(),
                variants: grouped.remove(canonical).unwrap_or_default(),
            })
            .collect()
    }

    fn exact_lookup(&self, cleaned: &str) -> Option<&str> {
        let forms = [
            cleaned.to_string(),
            cleaned.to_lowercase(),
            cleaned.to_uppercase(),
            title_case(cleaned),
        ];
        for form in &forms {
            if let Some(&idx) = self.index.get(form.as_str()) {
                return Some(self.mappings[idx].canonical.as_str());
            }
        }
        None
    }

    fn fuzzy_lookup(&self, cleaned_lower: &str) -> Option<&str> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, mapping) in self.mappings.iter().enumerate() {
            let score = similarity(cleaned_lower, &mapping.variant.to_lowercase());
            // Strictly-better keeps the first-encountered key on ties.
            if score > self.fuzzy_threshold && best.is_none_or(|(_, s)| score > s) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| self.mappings[idx].canonical.as_str())
    }

    fn insert_mapping(&mut self, variant: String, canonical: &str) {
        if variant.trim().is_empty() {
            return;
        }
        if let Some(&idx) = self.index.get(variant.as_str()) {
            let existing = &mut self.mappings[idx];
            if existing.canonical != canonical {
                tracing::warn!(
                    variant = %variant,
                    old = %existing.canonical,
                    new = %canonical,
                    "brand variant remapped"
                );
                existing.canonical = canonical.to_string();
            }
            return;
        }
        let idx = self.mappings.len();
        self.mappings.push(Mapping {
            variant: variant.clone(),
            canonical: canonical.to_string(),
        });
        self.index.insert(variant, idx);
    }
}

impl Default for BrandCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and validate a synonym catalog from a YAML file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, parsed, or fails
/// validation (blank names, or one variant claimed by two canonicals).
pub fn load_synonyms(path: &Path) -> Result<SynonymsFile, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: SynonymsFile = serde_yaml::from_str(&content)?;
    validate_synonyms(&file)?;

    Ok(file)
}

fn validate_synonyms(file: &SynonymsFile) -> Result<(), CatalogError> {
    let mut claimed: HashMap<String, &str> = HashMap::new();

    for entry in &file.synonyms {
        if entry.canonical.trim().is_empty() {
            return Err(CatalogError::Validation(
                "canonical name must be non-empty".to_string(),
            ));
        }
        for variant in &entry.variants {
            if variant.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "brand '{}' has a blank variant",
                    entry.canonical
                )));
            }
            let key = variant.to_lowercase();
            if let Some(other) = claimed.insert(key, entry.canonical.as_str()) {
                if other != entry.canonical {
                    return Err(CatalogError::Validation(format!(
                        "variant '{variant}' is claimed by both '{other}' and '{}'",
                        entry.canonical
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Strip punctuation (keeping `&`, apostrophes, hyphens) and collapse
/// whitespace runs to single spaces.
fn clean_surface(raw: &str) -> String {
    let stripped = PUNCT_RE.replace_all(raw, " ");
    WS_RUN_RE.replace_all(&stripped, " ").trim().to_string()
}

/// difflib-style similarity ratio: twice the matched character count over
/// the total length of both strings.
fn similarity(a: &str, b: &str) -> f64 {
    f64::from(TextDiff::from_chars(a, b).ratio())
}

/// Uppercase the first letter of each whitespace-separated token.
fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

/// Deterministic presentation identity for names the table does not know.
///
/// Title-cases each token; `&` passes through unchanged and the connector
/// words `and`/`of`/`the` stay lowercase.
fn fallback_identity(cleaned: &str) -> String {
    let mut formatted = Vec::new();
    for token in cleaned.split_whitespace() {
        if token == "&" {
            formatted.push("&".to_string());
        } else if token.eq_ignore_ascii_case("and")
            || token.eq_ignore_ascii_case("of")
            || token.eq_ignore_ascii_case("the")
        {
            formatted.push(token.to_lowercase());
        } else {
            formatted.push(capitalize(token));
        }
    }
    formatted.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_surface_strips_punctuation_and_collapses_whitespace() {
        assert_eq!(clean_surface("  Living   Proof!! "), "Living Proof");
        assert_eq!(clean_surface("Head & Shoulders"), "Head & Shoulders");
        assert_eq!(clean_surface("L'Oréal®"), "L'Oréal");
        assert_eq!(clean_surface("Coca-Cola"), "Coca-Cola");
        assert_eq!(clean_surface("!!!"), "");
    }

    #[test]
    fn case_variants_resolve_to_one_canonical() {
        let catalog = BrandCatalog::new();
        assert_eq!(catalog.normalize("living proof"), "Living Proof");
        assert_eq!(catalog.normalize("Living Proof"), "Living Proof");
        assert_eq!(catalog.normalize("LIVING PROOF"), "Living Proof");
    }

    #[test]
    fn chinese_alias_resolves_to_western_canonical() {
        let catalog = BrandCatalog::new();
        assert_eq!(catalog.normalize("卡诗"), "Kérastase");
        assert_eq!(catalog.normalize("海飞丝"), "Head & Shoulders");
    }

    #[test]
    fn fuzzy_match_absorbs_small_spelling_drift() {
        let catalog = BrandCatalog::new();
        // Hyphen survives cleanup but the key has a space.
        assert_eq!(catalog.normalize("Living-Proof"), "Living Proof");
        // Missing space entirely.
        assert_eq!(catalog.normalize("livingproof"), "Living Proof");
    }

    #[test]
    fn fuzzy_match_recovers_punctuation_lost_in_cleanup() {
        // Cleanup turns "MY.ORGANICS" into "MY ORGANICS", which no longer
        // matches the dotted key exactly; the fuzzy pass closes the gap.
        let catalog = BrandCatalog::new();
        assert_eq!(catalog.normalize("MY.ORGANICS"), "MY.ORGANICS");
        assert_eq!(catalog.normalize("my organics"), "MY.ORGANICS");
    }

    #[test]
    fn unknown_name_falls_back_to_title_case() {
        let catalog = BrandCatalog::new();
        assert_eq!(catalog.normalize("some new brand"), "Some New Brand");
        assert_eq!(catalog.normalize("x"), "X");
    }

    #[test]
    fn fallback_keeps_connectors_lowercase_and_ampersand_intact() {
        let catalog = BrandCatalog::empty();
        assert_eq!(
            catalog.normalize("house of wax and the crown"),
            "House of Wax and the Crown"
        );
        assert_eq!(catalog.normalize("tom & jerry"), "Tom & Jerry");
    }

    #[test]
    fn normalize_is_idempotent() {
        let catalog = BrandCatalog::new();
        for raw in [
            "living proof",
            "LIVING PROOF",
            "my organics",
            "卡诗",
            "some new brand",
            "tom & jerry",
            "l'oréal",
        ] {
            let once = catalog.normalize(raw);
            let twice = catalog.normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {raw:?}");
        }
    }

    #[test]
    fn normalize_list_drops_blanks_and_dedups_case_insensitively() {
        let catalog = BrandCatalog::new();
        let raw = vec![
            "living proof".to_string(),
            "LIVING PROOF".to_string(),
            "卡诗".to_string(),
            "   ".to_string(),
            "!!!".to_string(),
            "kerastase".to_string(),
        ];
        assert_eq!(
            catalog.normalize_list(&raw),
            vec!["Living Proof".to_string(), "Kérastase".to_string()]
        );
    }

    #[test]
    fn normalize_list_preserves_first_seen_order() {
        let catalog = BrandCatalog::new();
        let raw = vec![
            "多芬".to_string(),
            "潘婷".to_string(),
            "dove".to_string(),
        ];
        assert_eq!(
            catalog.normalize_list(&raw),
            vec!["Dove".to_string(), "Pantene".to_string()]
        );
    }

    #[test]
    fn runtime_synonyms_resolve_immediately() {
        let mut catalog = BrandCatalog::new();
        catalog.add_synonyms("Aveda", &["阿维达".to_string()]);
        assert_eq!(catalog.normalize("阿维达"), "Aveda");
        // Self-mapping covers the canonical's own case variants.
        assert_eq!(catalog.normalize("aveda"), "Aveda");
        assert_eq!(catalog.normalize("AVEDA"), "Aveda");
    }

    #[test]
    fn remapped_variant_takes_latest_canonical() {
        let mut catalog = BrandCatalog::empty();
        catalog.add_synonyms("Old Name", &["shared".to_string()]);
        catalog.add_synonyms("New Name", &["shared".to_string()]);
        assert_eq!(catalog.normalize("shared"), "New Name");
    }

    #[test]
    fn adding_synonyms_does_not_disturb_unrelated_lookups() {
        let mut catalog = BrandCatalog::new();
        let before = catalog.normalize("living proof");
        catalog.add_synonyms("Aveda", &["阿维达".to_string()]);
        assert_eq!(catalog.normalize("living proof"), before);
    }

    #[test]
    fn to_entries_groups_variants_by_canonical() {
        let mut catalog = BrandCatalog::empty();
        catalog.add_synonyms("Aveda", &["阿维达".to_string(), "aweda".to_string()]);
        catalog.add_synonyms("Dove", &["多芬".to_string()]);

        let entries = catalog.to_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].canonical, "Aveda");
        assert_eq!(
            entries[0].variants,
            vec![
                "aveda".to_string(),
                "阿维达".to_string(),
                "aweda".to_string()
            ]
        );
        assert_eq!(entries[1].canonical, "Dove");
    }

    #[test]
    fn import_round_trips_through_entries() {
        let mut source = BrandCatalog::empty();
        source.add_synonyms("Aveda", &["阿维达".to_string()]);
        let file = SynonymsFile {
            synonyms: source.to_entries(),
        };

        let mut restored = BrandCatalog::empty();
        restored.import(&file);
        assert_eq!(restored.normalize("阿维达"), "Aveda");
    }

    #[test]
    fn validate_rejects_blank_canonical() {
        let file = SynonymsFile {
            synonyms: vec![SynonymEntry {
                canonical: "  ".to_string(),
                variants: vec!["x".to_string()],
            }],
        };
        let err = validate_synonyms(&file).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn validate_rejects_variant_claimed_twice() {
        let file = SynonymsFile {
            synonyms: vec![
                SynonymEntry {
                    canonical: "Aveda".to_string(),
                    variants: vec!["shared".to_string()],
                },
                SynonymEntry {
                    canonical: "Dove".to_string(),
                    variants: vec!["Shared".to_string()],
                },
            ],
        };
        let err = validate_synonyms(&file).unwrap_err();
        assert!(err.to_string().contains("claimed by both"));
    }

    #[test]
    fn validate_accepts_repeated_entry_for_same_canonical() {
        let file = SynonymsFile {
            synonyms: vec![
                SynonymEntry {
                    canonical: "Aveda".to_string(),
                    variants: vec!["av".to_string()],
                },
                SynonymEntry {
                    canonical: "Aveda".to_string(),
                    variants: vec!["av".to_string(), "aveda usa".to_string()],
                },
            ],
        };
        assert!(validate_synonyms(&file).is_ok());
    }

    #[test]
    fn synonyms_yaml_parses_and_imports() {
        let yaml = r"
synonyms:
  - canonical: Living Proof
    variants:
      - living proof
      - 缕灵
  - canonical: Off&Relax
    variants:
      - offrelax
      - or hair
";
        let file: SynonymsFile = serde_yaml::from_str(yaml).unwrap();
        validate_synonyms(&file).unwrap();

        let mut catalog = BrandCatalog::empty();
        catalog.import(&file);
        assert_eq!(catalog.normalize("缕灵"), "Living Proof");
        assert_eq!(catalog.normalize("OR Hair"), "Off&Relax");
    }

    #[test]
    fn load_synonyms_missing_file_is_io_error() {
        let err = load_synonyms(Path::new("/nonexistent/synonyms.yaml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn load_synonyms_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("synonyms.yaml");
        assert!(
            path.exists(),
            "synonyms.yaml missing at {path:?}, required for this test"
        );
        let result = load_synonyms(&path);
        assert!(result.is_ok(), "failed to load synonyms.yaml: {result:?}");
        let file = result.unwrap();
        assert!(!file.synonyms.is_empty());
    }

    #[test]
    fn similarity_matches_difflib_expectations() {
        // 2 * matched / total: identical strings are 1.0, disjoint are 0.0.
        assert!((similarity("abc", "abc") - 1.0).abs() < 1e-6);
        assert!(similarity("abc", "xyz") < 1e-6);
        let partial = similarity("my organics", "my.organics");
        assert!(
            partial > 0.8 && partial < 1.0,
            "expected high partial ratio, got {partial}"
        );
    }
}
