//! Category resolution
//!
//! Maps a normalized participant to an age division, a weight band and a
//! category key, then checks the key against the catalog. The catalog is
//! handed in explicitly and shared read-only.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::{format_key, CategoryCatalog, Gender, Level};
use crate::normalize::NormalizedParticipant;

/// Age ranges (inclusive) in evaluation order. Ranges overlap at 12; the
/// earlier row wins.
pub const AGE_BRACKETS: [(i32, i32, &str); 7] = [
    (4, 6, "PRE_INFANTIL"),
    (7, 8, "INFANTIL_A"),
    (9, 10, "INFANTIL_B"),
    (11, 12, "INFANTIL_C"),
    (12, 14, "CADETE"),
    (15, 17, "JUVENIL"),
    (18, 100, "MAYORES"),
];

/// Division id for an age; first matching range wins
pub fn age_bracket(age: i32) -> Option<&'static str> {
    AGE_BRACKETS
        .iter()
        .find(|(min, max, _)| (*min..=*max).contains(&age))
        .map(|(_, _, division)| *division)
}

/// Inputs a category key is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Age,
    Division,
    Gender,
    Weight,
    WeightBand,
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CategoryField::Age => "age",
            CategoryField::Division => "division",
            CategoryField::Gender => "gender",
            CategoryField::Weight => "weight",
            CategoryField::WeightBand => "weight band",
        };
        f.write_str(name)
    }
}

/// Why a participant ended up without a category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// One or more inputs could not be determined
    MissingCategory { fields: Vec<CategoryField> },
    /// The key was built but the catalog does not list it
    InvalidCategory { key: String },
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusionReason::MissingCategory { fields } => {
                let names: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
                write!(f, "missing category ({})", names.join(", "))
            }
            ExclusionReason::InvalidCategory { key } => {
                write!(f, "category '{}' is not in the catalog", key)
            }
        }
    }
}

/// Resolves divisions, weight bands and keys against a shared catalog
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    catalog: Arc<CategoryCatalog>,
}

impl CategoryResolver {
    pub fn new(catalog: Arc<CategoryCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CategoryCatalog {
        &self.catalog
    }

    /// First catalog band of the division/gender that contains `weight`
    pub fn weight_bracket(&self, weight: f64, division: &str, gender: Gender) -> Option<&str> {
        self.catalog
            .weight_bands(division, gender)?
            .iter()
            .find(|band| band.matches(weight))
            .map(|band| band.label.as_str())
    }

    /// Build a key; `None` when any part is missing
    pub fn category_key(
        &self,
        division: Option<&str>,
        gender: Option<Gender>,
        level: Option<Level>,
        weight_band: Option<&str>,
    ) -> Option<String> {
        let name = self.catalog.division_name(division?);
        Some(format_key(level?, &name, gender?, weight_band?))
    }

    /// Keys absent from the catalog, deduplicated, in first-seen order
    pub fn validate<'a, I>(&self, keys: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        keys.into_iter()
            .filter(|key| !self.catalog.contains_key(key))
            .filter(|key| seen.insert(*key))
            .map(str::to_string)
            .collect()
    }

    /// Fill division, weight band and key on one participant. A key the
    /// catalog does not list is not kept; the participant is excluded with
    /// [`ExclusionReason::InvalidCategory`] instead. Returns the kept key.
    pub fn resolve(&self, participant: &mut NormalizedParticipant) -> Option<String> {
        let division = participant.age.and_then(age_bracket);
        let band = match (participant.weight, division, participant.gender) {
            (Some(weight), Some(division), Some(gender)) => {
                self.weight_bracket(weight, division, gender).map(str::to_string)
            }
            _ => None,
        };

        participant.division = division.map(str::to_string);
        participant.weight_band = band;
        let built = self.category_key(
            division,
            participant.gender,
            Some(participant.level),
            participant.weight_band.as_deref(),
        );

        let (key, exclusion) = match built {
            Some(key) if self.catalog.contains_key(&key) => (Some(key), None),
            Some(key) => {
                debug!(id = %participant.id, %key, "participant excluded: key not in catalog");
                (None, Some(ExclusionReason::InvalidCategory { key }))
            }
            None => {
                let fields = missing_fields(participant);
                debug!(
                    id = %participant.id,
                    source = %participant.source_id,
                    fields = ?fields,
                    "participant excluded: missing category"
                );
                (None, Some(ExclusionReason::MissingCategory { fields }))
            }
        };
        participant.category_key = key;
        participant.exclusion = exclusion;

        participant.category_key.clone()
    }

    /// Resolve every participant. Returns the built keys the catalog does not
    /// list, deduplicated, in first-seen order.
    pub fn resolve_all(&self, participants: &mut [NormalizedParticipant]) -> Vec<String> {
        for participant in participants.iter_mut() {
            self.resolve(participant);
        }

        let invalid = self.validate(participants.iter().filter_map(|p| match &p.exclusion {
            Some(ExclusionReason::InvalidCategory { key }) => Some(key.as_str()),
            _ => None,
        }));
        if !invalid.is_empty() {
            warn!(count = invalid.len(), keys = ?invalid, "category keys not in catalog");
        }
        invalid
    }
}

fn missing_fields(participant: &NormalizedParticipant) -> Vec<CategoryField> {
    let mut fields = Vec::new();
    if participant.age.is_none() {
        fields.push(CategoryField::Age);
    } else if participant.division.is_none() {
        fields.push(CategoryField::Division);
    }
    if participant.gender.is_none() {
        fields.push(CategoryField::Gender);
    }
    if participant.weight.is_none() {
        fields.push(CategoryField::Weight);
    } else if participant.division.is_some()
        && participant.gender.is_some()
        && participant.weight_band.is_none()
    {
        fields.push(CategoryField::WeightBand);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn resolver() -> CategoryResolver {
        CategoryResolver::new(Arc::new(CategoryCatalog::default()))
    }

    fn participant(
        age: Option<i32>,
        gender: Option<Gender>,
        weight: Option<f64>,
    ) -> NormalizedParticipant {
        NormalizedParticipant {
            id: "p1".to_string(),
            full_name: "Ana Ruiz".to_string(),
            academy: None,
            birthdate: None,
            age,
            gender,
            level: Level::Festival,
            weight,
            modality: None,
            division: None,
            weight_band: None,
            category_key: None,
            source_id: "club".to_string(),
            exclusion: None,
        }
    }

    #[test]
    fn test_age_bracket_table() {
        assert_eq!(age_bracket(3), None);
        assert_eq!(age_bracket(4), Some("PRE_INFANTIL"));
        assert_eq!(age_bracket(8), Some("INFANTIL_A"));
        assert_eq!(age_bracket(10), Some("INFANTIL_B"));
        assert_eq!(age_bracket(11), Some("INFANTIL_C"));
        assert_eq!(age_bracket(13), Some("CADETE"));
        assert_eq!(age_bracket(17), Some("JUVENIL"));
        assert_eq!(age_bracket(100), Some("MAYORES"));
        assert_eq!(age_bracket(101), None);
    }

    #[test]
    fn test_age_twelve_is_infantil_c() {
        assert_eq!(age_bracket(12), Some("INFANTIL_C"));
    }

    #[test]
    fn test_weight_bracket_boundaries() {
        let r = resolver();
        assert_eq!(r.weight_bracket(30.0, "INFANTIL_B", Gender::Masculino), Some("-30"));
        assert_eq!(r.weight_bracket(30.1, "INFANTIL_B", Gender::Masculino), Some("-33"));
        assert_eq!(r.weight_bracket(40.0, "INFANTIL_B", Gender::Masculino), Some("-40"));
        assert_eq!(r.weight_bracket(40.5, "INFANTIL_B", Gender::Masculino), Some("40+"));
        assert_eq!(r.weight_bracket(30.0, "CADETE", Gender::Femenino), Some("-33"));
        assert_eq!(r.weight_bracket(30.0, "UNKNOWN", Gender::Femenino), None);
    }

    #[test]
    fn test_category_key_format() {
        let r = resolver();
        let male = Some(Gender::Masculino);
        let noveles = Some(Level::Noveles);
        assert_eq!(
            r.category_key(Some("INFANTIL_B"), male, noveles, Some("-30")),
            Some("Noveles INFANTIL B MASCULINO -30".to_string())
        );
        assert_eq!(r.category_key(None, male, noveles, Some("-30")), None);
        assert_eq!(r.category_key(Some("INFANTIL_B"), male, noveles, None), None);
    }

    #[test]
    fn test_catalog_keys_validate_clean() {
        let r = resolver();
        let catalog = CategoryCatalog::default();
        let mut keys = Vec::new();
        for division in catalog.divisions() {
            for level in &division.levels {
                for gender in division.genders() {
                    for band in division.weight_bands(gender).unwrap() {
                        let key = r.category_key(
                            Some(division.id.as_str()),
                            Some(gender),
                            Some(*level),
                            Some(band.label.as_str()),
                        );
                        keys.push(key.unwrap());
                    }
                }
            }
        }
        assert!(r.validate(keys.iter().map(String::as_str)).is_empty());
    }

    #[test]
    fn test_validate_reports_unknown_once() {
        let r = resolver();
        let invalid = r.validate([
            "Festival MAYORES MASCULINO 200+",
            "Festival MAYORES MASCULINO -54",
            "Festival MAYORES MASCULINO 200+",
        ]);
        assert_eq!(invalid, vec!["Festival MAYORES MASCULINO 200+".to_string()]);
    }

    #[test]
    fn test_resolve_fills_fields() {
        let r = resolver();
        let mut p = participant(Some(9), Some(Gender::Masculino), Some(29.0));
        let key = r.resolve(&mut p);
        assert_eq!(key.as_deref(), Some("Festival INFANTIL B MASCULINO -30"));
        assert_eq!(p.division.as_deref(), Some("INFANTIL_B"));
        assert_eq!(p.weight_band.as_deref(), Some("-30"));
        assert_eq!(p.exclusion, None);
    }

    #[test]
    fn test_resolve_missing_fields() {
        let r = resolver();
        let mut p = participant(None, None, Some(29.0));
        assert_eq!(r.resolve(&mut p), None);
        assert_eq!(
            p.exclusion,
            Some(ExclusionReason::MissingCategory {
                fields: vec![CategoryField::Age, CategoryField::Gender]
            })
        );

        let mut too_young = participant(Some(2), Some(Gender::Femenino), None);
        r.resolve(&mut too_young);
        assert_eq!(
            too_young.exclusion,
            Some(ExclusionReason::MissingCategory {
                fields: vec![CategoryField::Division, CategoryField::Weight]
            })
        );
    }

    #[test]
    fn test_resolve_all_clears_invalid_keys() {
        let toml_str = r#"
[divisions.INFANTIL_B]
levels = ["Avanzados"]
genders = ["MASCULINO"]
weight_bands = ["-30", "30+"]
"#;
        let catalog = CategoryCatalog::from_str(toml_str).unwrap();
        let r = CategoryResolver::new(Arc::new(catalog));

        let mut participants = vec![participant(Some(9), Some(Gender::Masculino), Some(25.0))];
        participants[0].level = Level::Festival;
        let invalid = r.resolve_all(&mut participants);

        assert_eq!(invalid, vec!["Festival INFANTIL B MASCULINO -30".to_string()]);
        assert_eq!(participants[0].category_key, None);
        assert_eq!(
            participants[0].exclusion,
            Some(ExclusionReason::InvalidCategory {
                key: "Festival INFANTIL B MASCULINO -30".to_string()
            })
        );
    }

    #[test]
    fn test_resolve_never_keeps_unlisted_key() {
        let toml_str = r#"
[divisions.INFANTIL_B]
levels = ["Avanzados"]
genders = ["MASCULINO"]
weight_bands = ["-30", "30+"]
"#;
        let r = CategoryResolver::new(Arc::new(CategoryCatalog::from_str(toml_str).unwrap()));

        let mut p = participant(Some(9), Some(Gender::Masculino), Some(25.0));
        p.level = Level::Festival;
        assert_eq!(r.resolve(&mut p), None);
        assert_eq!(p.category_key, None);
        assert_eq!(p.weight_band.as_deref(), Some("-30"));
        assert_eq!(
            p.exclusion,
            Some(ExclusionReason::InvalidCategory {
                key: "Festival INFANTIL B MASCULINO -30".to_string()
            })
        );

        p.level = Level::Avanzados;
        assert_eq!(
            r.resolve(&mut p).as_deref(),
            Some("Avanzados INFANTIL B MASCULINO -30")
        );
        assert_eq!(p.exclusion, None);
    }

    #[test]
    fn test_exclusion_display() {
        let reason = ExclusionReason::MissingCategory {
            fields: vec![CategoryField::Age, CategoryField::WeightBand],
        };
        assert_eq!(reason.to_string(), "missing category (age, weight band)");
    }
}
