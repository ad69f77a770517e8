//! Official category catalog
//!
//! The catalog declares, per age division, the skill levels that compete, the
//! gender axis and the weight bands. It is loaded once (from TOML, or from the
//! embedded default) and is read-only afterwards, so a single instance can be
//! shared by every request through an `Arc`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating a catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("division '{division}': unknown level '{value}'")]
    UnknownLevel { division: String, value: String },
    #[error("division '{division}': unknown gender '{value}'")]
    UnknownGender { division: String, value: String },
    #[error("division '{division}': malformed weight band '{band}' (expected -NN or NN+)")]
    InvalidWeightBand { division: String, band: String },
    #[error("division '{division}': a flat gender list requires `weight_bands`")]
    MissingWeightBands { division: String },
    #[error("division '{division}': `{field}` must not be empty")]
    EmptyField {
        division: String,
        field: &'static str,
    },
    #[error("catalog declares no divisions")]
    NoDivisions,
}

/// Skill tier derived from belt or grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    Festival,
    Noveles,
    Avanzados,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Festival, Level::Noveles, Level::Avanzados];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Festival => "Festival",
            Level::Noveles => "Noveles",
            Level::Avanzados => "Avanzados",
        }
    }

    /// Parse a canonical level name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical competitor gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Masculino,
    Femenino,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Masculino, Gender::Femenino];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Masculino => "MASCULINO",
            Gender::Femenino => "FEMENINO",
        }
    }

    /// Parse a canonical gender name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bound of a weight band
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightBound {
    /// `-NN`: matches weights up to and including NN
    UpTo(f64),
    /// `NN+`: matches weights strictly above NN
    Over(f64),
}

/// A labelled weight range such as `-30` or `46+`
#[derive(Debug, Clone, PartialEq)]
pub struct WeightBand {
    pub label: String,
    pub bound: WeightBound,
}

impl WeightBand {
    /// Parse a band label; `None` when it follows neither `-NN` nor `NN+`
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let bound = if let Some(limit) = label.strip_prefix('-') {
            WeightBound::UpTo(limit.trim().parse().ok()?)
        } else if let Some(limit) = label.strip_suffix('+') {
            WeightBound::Over(limit.trim().parse().ok()?)
        } else {
            return None;
        };
        Some(Self {
            label: label.to_string(),
            bound,
        })
    }

    pub fn matches(&self, weight: f64) -> bool {
        match self.bound {
            WeightBound::UpTo(limit) => weight <= limit,
            WeightBound::Over(limit) => weight > limit,
        }
    }
}

/// How a division splits competitors by gender
#[derive(Debug, Clone, PartialEq)]
pub enum GenderAxis {
    /// Every gender shares the same weight bands
    Shared {
        genders: Vec<Gender>,
        bands: Vec<WeightBand>,
    },
    /// Each gender declares its own weight bands
    PerGender(Vec<(Gender, Vec<WeightBand>)>),
}

/// One age division of the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Division {
    /// Catalog identifier, e.g. `INFANTIL_B`
    pub id: String,
    /// Display name used inside category keys, e.g. `INFANTIL B`
    pub name: String,
    pub levels: Vec<Level>,
    pub genders: GenderAxis,
}

impl Division {
    /// Weight bands for a gender, in declaration order
    pub fn weight_bands(&self, gender: Gender) -> Option<&[WeightBand]> {
        match &self.genders {
            GenderAxis::Shared { genders, bands } => {
                genders.contains(&gender).then_some(bands.as_slice())
            }
            GenderAxis::PerGender(per_gender) => per_gender
                .iter()
                .find(|(g, _)| *g == gender)
                .map(|(_, bands)| bands.as_slice()),
        }
    }

    /// Genders declared by this division, in declaration order
    pub fn genders(&self) -> Vec<Gender> {
        match &self.genders {
            GenderAxis::Shared { genders, .. } => genders.clone(),
            GenderAxis::PerGender(per_gender) => per_gender.iter().map(|(g, _)| *g).collect(),
        }
    }
}

/// Build a category key from its parts
pub fn format_key(level: Level, division_name: &str, gender: Gender, band: &str) -> String {
    format!("{} {} {} {}", level, division_name, gender, band)
}

/// The immutable catalog of official categories
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    /// Optional name for the catalog
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    divisions: BTreeMap<String, Division>,
    valid_keys: OnceLock<HashSet<String>>,
}

/// TOML structure for deserializing catalogs
#[derive(Deserialize)]
struct TomlCatalog {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    divisions: BTreeMap<String, TomlDivision>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

#[derive(Deserialize)]
struct TomlDivision {
    name: Option<String>,
    levels: Vec<String>,
    genders: TomlGenders,
    weight_bands: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TomlGenders {
    Flat(Vec<String>),
    ByGender(BTreeMap<String, Vec<String>>),
}

/// Default catalog - seven age divisions, three levels each
const DEFAULT_CATALOG: &str = r#"
[metadata]
name = "Kyorugi default"
description = "Age divisions, levels and weight bands for sparring events"

[divisions.PRE_INFANTIL]
levels = ["Festival", "Noveles", "Avanzados"]
genders = ["MASCULINO", "FEMENINO"]
weight_bands = ["-18", "-21", "-24", "-27", "27+"]

[divisions.INFANTIL_A]
levels = ["Festival", "Noveles", "Avanzados"]
genders = ["MASCULINO", "FEMENINO"]
weight_bands = ["-21", "-24", "-27", "-30", "-33", "33+"]

[divisions.INFANTIL_B]
levels = ["Festival", "Noveles", "Avanzados"]
genders = ["MASCULINO", "FEMENINO"]
weight_bands = ["-24", "-27", "-30", "-33", "-36", "-40", "40+"]

[divisions.INFANTIL_C]
levels = ["Festival", "Noveles", "Avanzados"]
genders = ["MASCULINO", "FEMENINO"]
weight_bands = ["-29", "-32", "-35", "-38", "-42", "-46", "-50", "50+"]

[divisions.CADETE]
levels = ["Festival", "Noveles", "Avanzados"]

[divisions.CADETE.genders]
MASCULINO = ["-33", "-37", "-41", "-45", "-49", "-53", "-57", "-61", "-65", "65+"]
FEMENINO = ["-29", "-33", "-37", "-41", "-44", "-47", "-51", "-55", "-59", "59+"]

[divisions.JUVENIL]
levels = ["Festival", "Noveles", "Avanzados"]

[divisions.JUVENIL.genders]
MASCULINO = ["-45", "-48", "-51", "-55", "-59", "-63", "-68", "-73", "-78", "78+"]
FEMENINO = ["-42", "-44", "-46", "-49", "-52", "-55", "-59", "-63", "-68", "68+"]

[divisions.MAYORES]
levels = ["Festival", "Noveles", "Avanzados"]

[divisions.MAYORES.genders]
MASCULINO = ["-54", "-58", "-63", "-68", "-74", "-80", "-87", "87+"]
FEMENINO = ["-46", "-49", "-53", "-57", "-62", "-67", "-73", "73+"]
"#;

impl CategoryCatalog {
    /// Load catalog from TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load catalog from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;
        if parsed.divisions.is_empty() {
            return Err(CatalogError::NoDivisions);
        }

        let mut divisions = BTreeMap::new();
        for (id, raw) in parsed.divisions {
            let division = build_division(&id, raw)?;
            divisions.insert(id, division);
        }

        Ok(CategoryCatalog {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            divisions,
            valid_keys: OnceLock::new(),
        })
    }

    pub fn division(&self, id: &str) -> Option<&Division> {
        self.divisions.get(id)
    }

    /// Divisions ordered by identifier
    pub fn divisions(&self) -> impl Iterator<Item = &Division> {
        self.divisions.values()
    }

    /// Display name of a division; unknown ids fall back to `_` → space
    pub fn division_name(&self, id: &str) -> String {
        self.divisions
            .get(id)
            .map(|d| d.name.clone())
            .unwrap_or_else(|| id.replace('_', " "))
    }

    pub fn levels(&self, division: &str) -> Option<&[Level]> {
        self.divisions.get(division).map(|d| d.levels.as_slice())
    }

    pub fn weight_bands(&self, division: &str, gender: Gender) -> Option<&[WeightBand]> {
        self.divisions.get(division)?.weight_bands(gender)
    }

    /// Every valid category key, sorted
    pub fn combinations(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for division in self.divisions.values() {
            for level in &division.levels {
                for gender in division.genders() {
                    for band in division.weight_bands(gender).unwrap_or_default() {
                        keys.push(format_key(*level, &division.name, gender, &band.label));
                    }
                }
            }
        }
        keys.sort();
        keys
    }

    /// The full key cross-product, computed on first use
    pub fn valid_keys(&self) -> &HashSet<String> {
        self.valid_keys
            .get_or_init(|| self.combinations().into_iter().collect())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.valid_keys().contains(key)
    }

    /// Human-readable listing of every category, grouped by level and division
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for level in Level::ALL {
            let mut level_written = false;
            for division in self.divisions.values() {
                if !division.levels.contains(&level) {
                    continue;
                }
                if !level_written {
                    out.push_str(&format!("[{}]\n", level));
                    level_written = true;
                }
                out.push_str(&format!("  {}:\n", division.name));
                for gender in division.genders() {
                    for band in division.weight_bands(gender).unwrap_or_default() {
                        out.push_str(&format!(
                            "    - {}\n",
                            format_key(level, &division.name, gender, &band.label)
                        ));
                    }
                }
            }
        }
        out.push_str(&format!("Total categories: {}\n", self.valid_keys().len()));
        out
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::from_str(DEFAULT_CATALOG).expect("Default catalog should be valid TOML")
    }
}

fn build_division(id: &str, raw: TomlDivision) -> Result<Division, CatalogError> {
    if raw.levels.is_empty() {
        return Err(CatalogError::EmptyField {
            division: id.to_string(),
            field: "levels",
        });
    }
    let levels = raw
        .levels
        .iter()
        .map(|value| {
            Level::from_name(value).ok_or_else(|| CatalogError::UnknownLevel {
                division: id.to_string(),
                value: value.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let genders = match raw.genders {
        TomlGenders::Flat(names) => {
            if names.is_empty() {
                return Err(CatalogError::EmptyField {
                    division: id.to_string(),
                    field: "genders",
                });
            }
            let bands = raw
                .weight_bands
                .ok_or_else(|| CatalogError::MissingWeightBands {
                    division: id.to_string(),
                })?;
            GenderAxis::Shared {
                genders: names
                    .iter()
                    .map(|name| parse_gender(id, name))
                    .collect::<Result<_, _>>()?,
                bands: parse_bands(id, &bands)?,
            }
        }
        TomlGenders::ByGender(per_gender) => {
            if per_gender.is_empty() {
                return Err(CatalogError::EmptyField {
                    division: id.to_string(),
                    field: "genders",
                });
            }
            let mut axis = Vec::with_capacity(per_gender.len());
            for (name, bands) in &per_gender {
                axis.push((parse_gender(id, name)?, parse_bands(id, bands)?));
            }
            GenderAxis::PerGender(axis)
        }
    };

    Ok(Division {
        id: id.to_string(),
        name: raw.name.unwrap_or_else(|| id.replace('_', " ")),
        levels,
        genders,
    })
}

fn parse_gender(division: &str, name: &str) -> Result<Gender, CatalogError> {
    Gender::from_name(name).ok_or_else(|| CatalogError::UnknownGender {
        division: division.to_string(),
        value: name.to_string(),
    })
}

fn parse_bands(division: &str, labels: &[String]) -> Result<Vec<WeightBand>, CatalogError> {
    if labels.is_empty() {
        return Err(CatalogError::EmptyField {
            division: division.to_string(),
            field: "weight_bands",
        });
    }
    labels
        .iter()
        .map(|label| {
            WeightBand::parse(label).ok_or_else(|| CatalogError::InvalidWeightBand {
                division: division.to_string(),
                band: label.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = CategoryCatalog::default();
        assert!(catalog.division("PRE_INFANTIL").is_some());
        assert!(catalog.division("MAYORES").is_some());
        assert_eq!(catalog.divisions().count(), 7);
        assert_eq!(catalog.name.as_deref(), Some("Kyorugi default"));
    }

    #[test]
    fn test_division_name_fallback() {
        let catalog = CategoryCatalog::default();
        assert_eq!(catalog.division_name("INFANTIL_C"), "INFANTIL C");
        assert_eq!(catalog.division_name("SENIOR_MASTERS"), "SENIOR MASTERS");
    }

    #[test]
    fn test_weight_band_parse() {
        let upper = WeightBand::parse("-30").unwrap();
        assert_eq!(upper.bound, WeightBound::UpTo(30.0));
        assert!(upper.matches(30.0));
        assert!(!upper.matches(30.1));

        let lower = WeightBand::parse("46+").unwrap();
        assert_eq!(lower.bound, WeightBound::Over(46.0));
        assert!(!lower.matches(46.0));
        assert!(lower.matches(46.5));

        assert_eq!(
            WeightBand::parse("-27.5").unwrap().bound,
            WeightBound::UpTo(27.5)
        );
        assert!(WeightBand::parse("30").is_none());
        assert!(WeightBand::parse("-abc").is_none());
    }

    #[test]
    fn test_per_gender_bands() {
        let catalog = CategoryCatalog::default();
        let male = catalog.weight_bands("CADETE", Gender::Masculino).unwrap();
        let female = catalog.weight_bands("CADETE", Gender::Femenino).unwrap();
        assert_eq!(male[0].label, "-33");
        assert_eq!(female[0].label, "-29");
    }

    #[test]
    fn test_combinations_cover_cross_product() {
        let catalog = CategoryCatalog::default();
        let keys = catalog.combinations();
        // 3 levels x 2 genders x 5 bands
        let pre: Vec<_> = keys.iter().filter(|k| k.contains("PRE INFANTIL")).collect();
        assert_eq!(pre.len(), 30);
        assert!(keys.contains(&"Noveles INFANTIL B MASCULINO -30".to_string()));
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(catalog.valid_keys().len(), keys.len());
    }

    #[test]
    fn test_custom_display_name() {
        let toml_str = r#"
[divisions.SUB_21]
name = "SUB21"
levels = ["Avanzados"]
genders = ["FEMENINO"]
weight_bands = ["-57", "57+"]
"#;
        let catalog = CategoryCatalog::from_str(toml_str).expect("Should parse");
        assert!(catalog.contains_key("Avanzados SUB21 FEMENINO 57+"));
        assert!(!catalog.contains_key("Avanzados SUB 21 FEMENINO 57+"));
    }

    #[test]
    fn test_unknown_level_error() {
        let toml_str = r#"
[divisions.MAYORES]
levels = ["Experts"]
genders = ["MASCULINO"]
weight_bands = ["-80"]
"#;
        let err = CategoryCatalog::from_str(toml_str).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownLevel { .. }));
    }

    #[test]
    fn test_invalid_band_error() {
        let toml_str = r#"
[divisions.MAYORES]
levels = ["Festival"]
genders = ["MASCULINO"]
weight_bands = ["80kg"]
"#;
        let err = CategoryCatalog::from_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("80kg"));
    }

    #[test]
    fn test_flat_axis_requires_bands() {
        let toml_str = r#"
[divisions.MAYORES]
levels = ["Festival"]
genders = ["MASCULINO", "FEMENINO"]
"#;
        let err = CategoryCatalog::from_str(toml_str).unwrap_err();
        assert!(matches!(err, CatalogError::MissingWeightBands { .. }));
    }

    #[test]
    fn test_empty_catalog_error() {
        let err = CategoryCatalog::from_str("").unwrap_err();
        assert!(matches!(err, CatalogError::NoDivisions));
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        let result = CategoryCatalog::from_str(invalid);
        assert!(matches!(result, Err(CatalogError::ParseError(_))));
    }

    #[test]
    fn test_level_and_gender_names() {
        assert_eq!(Level::from_name(" noveles "), Some(Level::Noveles));
        assert_eq!(Level::from_name("Intermedio"), None);
        assert_eq!(Gender::from_name("femenino"), Some(Gender::Femenino));
        assert_eq!(Gender::Masculino.to_string(), "MASCULINO");
    }
}
