//! Entrant labels

use serde::{Deserialize, Serialize};

use crate::group::Competitor;
use crate::normalize::NormalizedParticipant;

const ELLIPSIS: &str = "...";

/// One name on the draw sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    #[serde(default)]
    pub academy: Option<String>,
}

impl Entrant {
    pub fn new(name: impl Into<String>, academy: Option<String>) -> Self {
        Self {
            name: name.into(),
            academy,
        }
    }

    /// `name (academy)`, or just the name without an academy
    pub fn label(&self) -> String {
        match self.academy.as_deref().map(str::trim) {
            Some(academy) if !academy.is_empty() => format!("{} ({})", self.name.trim(), academy),
            _ => self.name.trim().to_string(),
        }
    }
}

impl Competitor for Entrant {
    fn name(&self) -> &str {
        &self.name
    }

    fn academy(&self) -> Option<&str> {
        self.academy.as_deref()
    }

    fn category_key(&self) -> Option<&str> {
        None
    }
}

impl From<&NormalizedParticipant> for Entrant {
    fn from(participant: &NormalizedParticipant) -> Self {
        Self::new(participant.full_name.clone(), participant.academy.clone())
    }
}

/// Shorten a label longer than `limit` characters to `limit - 3`
/// characters plus an ellipsis
pub fn truncate_label(label: &str, limit: usize) -> String {
    if label.chars().count() <= limit {
        return label.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.len());
    let mut out: String = label.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
