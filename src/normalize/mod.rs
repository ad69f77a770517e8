//! Record normalization
//!
//! Discovers the logical fields of a source, then turns each raw row into a
//! [`NormalizedParticipant`] with typed fields. Unparseable cells become
//! `None`; only a source missing a required column is rejected outright.

pub mod columns;
pub mod error;
pub mod fields;

pub use columns::{detect_columns, ColumnMapping, LogicalField};
pub use error::NormalizeError;
pub use fields::{
    compute_age, is_combat_modality, normalize_gender, normalize_level, normalize_modality,
    normalize_weight, parse_birthdate, COMBAT_MODALITIES,
};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{Gender, Level};
use crate::category::ExclusionReason;
use crate::source::{RawRecord, SourceTable};

/// One competitor with typed, normalized fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedParticipant {
    pub id: String,
    pub full_name: String,
    pub academy: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub age: Option<i32>,
    pub gender: Option<Gender>,
    pub level: Level,
    pub weight: Option<f64>,
    pub modality: Option<String>,
    /// Age division id, filled by the resolver
    pub division: Option<String>,
    pub weight_band: Option<String>,
    pub category_key: Option<String>,
    pub source_id: String,
    /// Why the participant has no category, if it has none
    pub exclusion: Option<ExclusionReason>,
}

/// The normalized rows of one source
#[derive(Debug, Clone)]
pub struct NormalizedSource {
    pub source_id: String,
    pub columns: ColumnMapping,
    pub participants: Vec<NormalizedParticipant>,
    /// Rows dropped by the modality filter
    pub filtered_out: usize,
}

/// Keep the rows whose modality is in `allowed`, with their row index.
/// Without a modality column every row is kept; blank cells are kept too.
pub fn filter_by_modality<'a>(
    rows: &'a [RawRecord],
    modality_column: Option<&str>,
    allowed: &[&str],
) -> Vec<(usize, &'a RawRecord)> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            let Some(value) = modality_column.and_then(|column| row.get(column)) else {
                return true;
            };
            allowed.contains(&normalize_modality(value).as_str())
        })
        .collect()
}

/// Turns raw rows into normalized participants
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    reference_date: NaiveDate,
    modality_filter: bool,
}

impl RecordNormalizer {
    /// Ages are computed as of `reference_date`
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            modality_filter: true,
        }
    }

    /// Enable or disable dropping non-combat modalities
    pub fn with_modality_filter(mut self, enabled: bool) -> Self {
        self.modality_filter = enabled;
        self
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn normalize_source(
        &self,
        source: &SourceTable,
    ) -> Result<NormalizedSource, NormalizeError> {
        let mapping = detect_columns(&source.columns);
        let missing = mapping.missing_required();
        if !missing.is_empty() {
            warn!(
                source = %source.id,
                missing = ?missing,
                "source rejected: required columns not found"
            );
            return Err(NormalizeError::missing_columns(
                &source.id,
                missing,
                source.columns.clone(),
            ));
        }

        for (field, column) in mapping.iter() {
            debug!(source = %source.id, %field, column, "column detected");
        }

        let rows: Vec<(usize, &RawRecord)> = if self.modality_filter {
            filter_by_modality(
                &source.rows,
                mapping.get(LogicalField::Modality),
                &COMBAT_MODALITIES,
            )
        } else {
            source.rows.iter().enumerate().collect()
        };
        let filtered_out = source.rows.len() - rows.len();
        if rows.is_empty() {
            warn!(source = %source.id, filtered_out, "source rejected: no participants");
            return Err(NormalizeError::NoParticipants {
                source_id: source.id.clone(),
                found: source.columns.clone(),
            });
        }

        let participants: Vec<_> = rows
            .into_iter()
            .map(|(index, row)| self.normalize_record(&source.id, index, row, &mapping))
            .collect();

        info!(
            source = %source.id,
            rows = source.rows.len(),
            participants = participants.len(),
            filtered_out,
            "source normalized"
        );

        Ok(NormalizedSource {
            source_id: source.id.clone(),
            columns: mapping,
            participants,
            filtered_out,
        })
    }

    /// Normalize one row. `row_index` is 0-based; ids and fallback names use
    /// the 1-based row number.
    pub fn normalize_record(
        &self,
        source_id: &str,
        row_index: usize,
        row: &RawRecord,
        mapping: &ColumnMapping,
    ) -> NormalizedParticipant {
        let cell = |field: LogicalField| mapping.get(field).and_then(|column| row.get(column));
        let row_number = row_index + 1;

        let full_name = match (cell(LogicalField::Name), cell(LogicalField::Surname)) {
            (Some(name), Some(surname)) => format!("{} {}", name, surname),
            (Some(name), None) => name.to_string(),
            (None, Some(surname)) => surname.to_string(),
            (None, None) => format!("Participant {}", row_number),
        };

        let id = cell(LogicalField::DocumentId)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}#{}", source_id, row_number));

        let birthdate = cell(LogicalField::Birthdate).and_then(parse_birthdate);

        NormalizedParticipant {
            id,
            full_name,
            academy: cell(LogicalField::Academy).map(str::to_string),
            birthdate,
            age: compute_age(birthdate, self.reference_date),
            gender: cell(LogicalField::Gender).and_then(normalize_gender),
            level: normalize_level(cell(LogicalField::Level)),
            weight: cell(LogicalField::Weight).and_then(normalize_weight),
            modality: cell(LogicalField::Modality).map(normalize_modality),
            division: None,
            weight_band: None,
            category_key: None,
            source_id: source_id.to_string(),
            exclusion: None,
        }
    }
}
