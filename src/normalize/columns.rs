//! Logical field discovery in arbitrary column layouts

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// A field the pipeline understands, independent of how a source names it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    Name,
    Surname,
    DocumentId,
    Birthdate,
    Gender,
    Level,
    Weight,
    Modality,
    Academy,
}

impl LogicalField {
    pub const ALL: [LogicalField; 9] = [
        LogicalField::Name,
        LogicalField::Surname,
        LogicalField::DocumentId,
        LogicalField::Birthdate,
        LogicalField::Gender,
        LogicalField::Level,
        LogicalField::Weight,
        LogicalField::Modality,
        LogicalField::Academy,
    ];

    /// Fields without which a source cannot be categorized
    pub const REQUIRED: [LogicalField; 4] = [
        LogicalField::Birthdate,
        LogicalField::Gender,
        LogicalField::Level,
        LogicalField::Weight,
    ];

    /// Lowercase substring patterns, tried in order
    pub fn patterns(&self) -> &'static [&'static str] {
        match self {
            LogicalField::Name => &["nombre", "name", "first"],
            LogicalField::Surname => &["apellido", "surname", "last name", "lastname"],
            LogicalField::DocumentId => &[
                "documento",
                "dni",
                "cedula",
                "cédula",
                "document",
                "pasaporte",
                "passport",
            ],
            LogicalField::Birthdate => &["nacim", "fecha", "birth", "nacimiento"],
            LogicalField::Gender => &["sexo", "genero", "género", "gender", "sex"],
            LogicalField::Level => &[
                "kup", "dan", "nivel", "grado", "cinturon", "cinturón", "belt",
            ],
            LogicalField::Weight => &["peso", "weight", "kg", "kilos"],
            LogicalField::Modality => &["modalidad", "modality", "disciplina", "discipline"],
            LogicalField::Academy => &[
                "abreviatura",
                "abbreviation",
                "abrev",
                "academia",
                "academy",
                "club",
            ],
        }
    }

    /// Substrings that disqualify a column even when a pattern matches.
    /// Keeps "Apellido y nombre" or "Academy name" out of the name field.
    pub fn exclusions(&self) -> &'static [&'static str] {
        match self {
            LogicalField::Name => &["apellido", "surname", "last", "academ", "club"],
            _ => &[],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalField::Name => "name",
            LogicalField::Surname => "surname",
            LogicalField::DocumentId => "document_id",
            LogicalField::Birthdate => "birthdate",
            LogicalField::Gender => "gender",
            LogicalField::Level => "level",
            LogicalField::Weight => "weight",
            LogicalField::Modality => "modality",
            LogicalField::Academy => "academy",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical field → source column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnMapping {
    columns: BTreeMap<LogicalField, String>,
}

impl ColumnMapping {
    pub fn get(&self, field: LogicalField) -> Option<&str> {
        self.columns.get(&field).map(|c| c.as_str())
    }

    pub fn insert(&mut self, field: LogicalField, column: impl Into<String>) {
        self.columns.insert(field, column.into());
    }

    /// Required fields with no detected column, in declaration order
    pub fn missing_required(&self) -> Vec<LogicalField> {
        LogicalField::REQUIRED
            .into_iter()
            .filter(|f| !self.columns.contains_key(f))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalField, &str)> {
        self.columns.iter().map(|(f, c)| (*f, c.as_str()))
    }
}

/// Map each logical field to a column. For every field the first pattern
/// that matches any column wins, and among the columns it matches the first
/// in declaration order is taken.
pub fn detect_columns(column_names: &[String]) -> ColumnMapping {
    let lowered: Vec<String> = column_names.iter().map(|c| c.to_lowercase()).collect();
    let mut mapping = ColumnMapping::default();

    for field in LogicalField::ALL {
        let exclusions = field.exclusions();
        let found = field.patterns().iter().find_map(|pattern| {
            lowered.iter().position(|column| {
                column.contains(pattern) && !exclusions.iter().any(|ex| column.contains(ex))
            })
        });
        if let Some(index) = found {
            mapping.insert(field, column_names[index].clone());
        }
    }

    mapping
}
