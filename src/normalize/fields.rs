//! Value normalization for individual cells

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::catalog::{Gender, Level};

/// Date formats tried in order; the first successful parse wins
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Spreadsheet exports often stringify dates with a time component
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

const MASCULINE_VARIANTS: [&str; 9] = [
    "M",
    "MASCULINO",
    "MALE",
    "HOMBRE",
    "H",
    "MASC",
    "MASCULINOS",
    "VARON",
    "VARÓN",
];

const FEMININE_VARIANTS: [&str; 8] = [
    "F",
    "FEMENINO",
    "FEMALE",
    "MUJER",
    "FEM",
    "FEMENINOS",
    "DAMA",
    "DAMAS",
];

const LEVEL_VARIANTS: [(&str, Level); 21] = [
    ("FESTIVAL", Level::Festival),
    ("PRINCIPIANTE", Level::Festival),
    ("INICIAL", Level::Festival),
    ("BLANCO", Level::Festival),
    ("AMARILLO", Level::Festival),
    ("BLANCO AMARILLO", Level::Festival),
    ("AMARILLO VERDE", Level::Festival),
    ("NOVELES", Level::Noveles),
    ("NOVEL", Level::Noveles),
    ("INTERMEDIO", Level::Noveles),
    ("INTERMEDIOS", Level::Noveles),
    ("VERDE", Level::Noveles),
    ("AZUL", Level::Noveles),
    ("VERDE AZUL", Level::Noveles),
    ("AZUL ROJO", Level::Noveles),
    ("AVANZADOS", Level::Avanzados),
    ("AVANZADO", Level::Avanzados),
    ("ROJO", Level::Avanzados),
    ("NEGRO", Level::Avanzados),
    ("ROJO NEGRO", Level::Avanzados),
    ("DAN", Level::Avanzados),
];

/// Modalities that denote sparring events; forms disciplines are excluded
pub const COMBAT_MODALITIES: [&str; 5] = ["KYORUGUI", "KYORUGI", "COMBATE", "SPARRING", "LUCHA"];

/// Upper-case and collapse internal whitespace
fn canonical(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

pub fn parse_birthdate(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
                .map(|dt| dt.date())
        })
}

/// Whole years between `birthdate` and `reference`; the birthday itself counts
pub fn compute_age(birthdate: Option<NaiveDate>, reference: NaiveDate) -> Option<i32> {
    let birth = birthdate?;
    let mut age = reference.year() - birth.year();
    if (reference.month(), reference.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

pub fn normalize_gender(value: &str) -> Option<Gender> {
    let value = canonical(value);
    if MASCULINE_VARIANTS.contains(&value.as_str()) {
        Some(Gender::Masculino)
    } else if FEMININE_VARIANTS.contains(&value.as_str()) {
        Some(Gender::Femenino)
    } else {
        None
    }
}

/// Map a belt/grade description to a level. Never fails: anything
/// unrecognized is Festival.
pub fn normalize_level(value: Option<&str>) -> Level {
    let Some(value) = value else {
        return Level::Festival;
    };
    let value = canonical(value);

    if let Some((_, level)) = LEVEL_VARIANTS.iter().find(|(variant, _)| *variant == value) {
        return *level;
    }

    // Black belt grades outrank any digit in the text ("3 DAN" is not 3rd kup)
    if value.contains("DAN") {
        return Level::Avanzados;
    }

    let digits = value
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty());
    match digits.and_then(|run| run.parse::<u32>().ok()) {
        Some(7..=10) => Level::Festival,
        Some(3..=6) => Level::Noveles,
        Some(1..=2) => Level::Avanzados,
        _ => Level::Festival,
    }
}

/// Parse a body weight in kilograms
pub fn normalize_weight(value: &str) -> Option<f64> {
    let lowered = value.trim().to_lowercase();
    let number = lowered
        .strip_suffix("kgs")
        .or_else(|| lowered.strip_suffix("kg"))
        .unwrap_or(lowered.as_str())
        .trim()
        .replace(',', ".");
    number
        .parse::<f64>()
        .ok()
        .filter(|w| w.is_finite() && *w > 0.0)
}

pub fn normalize_modality(value: &str) -> String {
    canonical(value)
}

pub fn is_combat_modality(value: &str) -> bool {
    COMBAT_MODALITIES.contains(&normalize_modality(value).as_str())
}
