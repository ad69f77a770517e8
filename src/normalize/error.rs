//! Error types for record normalization

use thiserror::Error;

use super::columns::LogicalField;

/// Errors that reject a whole source during normalization
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// One or more required logical fields have no matching column
    #[error(
        "source '{source_id}' is missing required columns: {} (found: {})",
        join_fields(.missing),
        .found.join(", ")
    )]
    MissingColumns {
        source_id: String,
        missing: Vec<LogicalField>,
        found: Vec<String>,
    },

    /// Nothing left to categorize, after the modality filter if enabled
    #[error("source '{source_id}' has no participants")]
    NoParticipants {
        source_id: String,
        found: Vec<String>,
    },
}

impl NormalizeError {
    pub fn missing_columns(
        source_id: impl Into<String>,
        missing: Vec<LogicalField>,
        found: Vec<String>,
    ) -> Self {
        Self::MissingColumns {
            source_id: source_id.into(),
            missing,
            found,
        }
    }

    /// Logical fields that could not be detected
    pub fn missing(&self) -> &[LogicalField] {
        match self {
            Self::MissingColumns { missing, .. } => missing,
            Self::NoParticipants { .. } => &[],
        }
    }

    /// Column names the source actually declared
    pub fn found(&self) -> &[String] {
        match self {
            Self::MissingColumns { found, .. } | Self::NoParticipants { found, .. } => found,
        }
    }
}

fn join_fields(fields: &[LogicalField]) -> String {
    fields
        .iter()
        .map(|f| f.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_display() {
        let err = NormalizeError::missing_columns(
            "club_a",
            vec![LogicalField::Birthdate, LogicalField::Weight],
            vec!["Nombre".to_string(), "Sexo".to_string()],
        );
        let message = err.to_string();
        assert!(message.contains("club_a"));
        assert!(message.contains("birthdate, weight"));
        assert!(message.contains("Nombre, Sexo"));
        assert_eq!(err.missing().len(), 2);
    }

    #[test]
    fn test_no_participants_display() {
        let err = NormalizeError::NoParticipants {
            source_id: "club_b".to_string(),
            found: vec!["Nombre".to_string()],
        };
        assert_eq!(err.to_string(), "source 'club_b' has no participants");
        assert!(err.missing().is_empty());
        assert_eq!(err.found(), ["Nombre".to_string()]);
    }
}
