//! Participant grouping
//!
//! Groups resolved participants by category key, isolates solo categories and
//! summarizes a processed tournament.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::catalog::{Gender, Level};
use crate::normalize::NormalizedParticipant;

/// Participants sharing one category key, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub key: String,
    pub participants: Vec<NormalizedParticipant>,
}

impl CategoryGroup {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// A group with a single participant gets no bracket
    pub fn is_solo(&self) -> bool {
        self.participants.len() == 1
    }
}

/// Category groups in the order their keys were first seen
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryGroups {
    groups: Vec<CategoryGroup>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl CategoryGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, participant: NormalizedParticipant) {
        match self.index.get(key) {
            Some(&slot) => self.groups[slot].participants.push(participant),
            None => {
                self.index.insert(key.to_string(), self.groups.len());
                self.groups.push(CategoryGroup {
                    key: key.to_string(),
                    participants: vec![participant],
                });
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&CategoryGroup> {
        self.index.get(key).map(|&slot| &self.groups[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.groups.iter()
    }

    /// Groups large enough for a bracket
    pub fn bracket_groups(&self) -> impl Iterator<Item = &CategoryGroup> {
        self.groups.iter().filter(|g| g.len() >= 2)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group participants by category key. Participants without a key are
/// skipped; relative order inside a group follows the input.
pub fn group(participants: &[NormalizedParticipant]) -> CategoryGroups {
    let mut groups = CategoryGroups::new();
    for participant in participants {
        if let Some(key) = &participant.category_key {
            groups.push(key, participant.clone());
        }
    }
    groups
}

/// Keys of groups with exactly one participant, sorted
pub fn solos(groups: &CategoryGroups) -> Vec<String> {
    let mut keys: Vec<String> = groups
        .iter()
        .filter(|g| g.is_solo())
        .map(|g| g.key.clone())
        .collect();
    keys.sort();
    keys
}

/// Anything that can be entered in a bracket
pub trait Competitor {
    fn name(&self) -> &str;
    fn academy(&self) -> Option<&str>;
    /// `None` when the category is implied by the surrounding list
    fn category_key(&self) -> Option<&str>;
}

impl Competitor for NormalizedParticipant {
    fn name(&self) -> &str {
        &self.full_name
    }

    fn academy(&self) -> Option<&str> {
        self.academy.as_deref()
    }

    fn category_key(&self) -> Option<&str> {
        self.category_key.as_deref()
    }
}

/// Drop repeated entries from one category list, keeping the first.
/// Entries are equal when upper-trimmed name, key and upper-trimmed academy
/// all match.
pub fn deduplicate<T: Competitor + Clone>(entries: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| {
            seen.insert((
                entry.name().trim().to_uppercase(),
                entry.category_key().map(str::to_string),
                entry.academy().unwrap_or_default().trim().to_uppercase(),
            ))
        })
        .cloned()
        .collect()
}

/// Number of categories listed under "top categories"
const TOP_CATEGORIES: usize = 10;

/// Tournament-wide counts and category lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentSummary {
    pub total_participants: usize,
    pub categorized: usize,
    pub excluded: usize,
    /// Categorized participants per level
    pub by_level: BTreeMap<Level, usize>,
    pub by_gender: BTreeMap<Gender, usize>,
    /// Largest categories, ties broken by key
    pub top_categories: Vec<(String, usize)>,
    pub solos: Vec<String>,
    pub brackets: Vec<String>,
}

impl TournamentSummary {
    pub fn new(participants: &[NormalizedParticipant], groups: &CategoryGroups) -> Self {
        let mut by_level = BTreeMap::new();
        let mut by_gender = BTreeMap::new();
        for participant in participants.iter().filter(|p| p.category_key.is_some()) {
            *by_level.entry(participant.level).or_insert(0) += 1;
            if let Some(gender) = participant.gender {
                *by_gender.entry(gender).or_insert(0) += 1;
            }
        }

        let mut top_categories: Vec<(String, usize)> =
            groups.iter().map(|g| (g.key.clone(), g.len())).collect();
        top_categories.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        top_categories.truncate(TOP_CATEGORIES);

        let categorized = participants
            .iter()
            .filter(|p| p.category_key.is_some())
            .count();

        Self {
            total_participants: participants.len(),
            categorized,
            excluded: participants.len() - categorized,
            by_level,
            by_gender,
            top_categories,
            solos: solos(groups),
            brackets: groups.bracket_groups().map(|g| g.key.clone()).collect(),
        }
    }
}

impl fmt::Display for TournamentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TOURNAMENT SUMMARY")?;
        writeln!(f, "{}", "=".repeat(50))?;
        writeln!(f)?;
        writeln!(f, "Total participants: {}", self.total_participants)?;
        writeln!(f, "Categorized: {}", self.categorized)?;
        writeln!(f, "Excluded: {}", self.excluded)?;
        writeln!(f, "Solo categories: {}", self.solos.len())?;
        writeln!(f, "Bracket categories: {}", self.brackets.len())?;

        writeln!(f)?;
        writeln!(f, "BY LEVEL:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for (level, count) in &self.by_level {
            writeln!(f, "{}: {} participants", level, count)?;
        }

        writeln!(f)?;
        writeln!(f, "BY GENDER:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for (gender, count) in &self.by_gender {
            writeln!(f, "{}: {} participants", gender, count)?;
        }

        writeln!(f)?;
        writeln!(f, "TOP CATEGORIES:")?;
        writeln!(f, "{}", "-".repeat(40))?;
        for (key, count) in &self.top_categories {
            writeln!(f, "{}: {} participants", key, count)?;
        }

        writeln!(f)?;
        writeln!(f, "SOLO CATEGORIES:")?;
        writeln!(f, "{}", "-".repeat(30))?;
        for key in &self.solos {
            writeln!(f, "- {}", key)?;
        }

        writeln!(f)?;
        writeln!(f, "BRACKETS: {}", self.brackets.len())?;
        writeln!(f, "{}", "-".repeat(30))?;
        for key in &self.brackets {
            writeln!(f, "- {}", key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn participant(name: &str, key: Option<&str>, source: &str) -> NormalizedParticipant {
        NormalizedParticipant {
            id: format!("{}#{}", source, name),
            full_name: name.to_string(),
            academy: Some("DGA".to_string()),
            birthdate: None,
            age: Some(12),
            gender: Some(Gender::Femenino),
            level: Level::Festival,
            weight: Some(28.0),
            modality: None,
            division: None,
            weight_band: None,
            category_key: key.map(str::to_string),
            source_id: source.to_string(),
            exclusion: None,
        }
    }

    #[test]
    fn test_group_preserves_first_seen_order() {
        let participants = vec![
            participant("Ana", Some("B"), "one"),
            participant("Bea", Some("A"), "one"),
            participant("Cris", Some("B"), "two"),
            participant("Dora", None, "two"),
        ];
        let groups = group(&participants);
        let keys: Vec<_> = groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["B", "A"]);

        let names: Vec<_> = groups
            .get("B")
            .unwrap()
            .participants
            .iter()
            .map(|p| p.full_name.as_str())
            .collect();
        assert_eq!(names, vec!["Ana", "Cris"]);
    }

    #[test]
    fn test_solos_independent_of_source_order() {
        let a = participant("Ana", Some("A"), "one");
        let b = participant("Bea", Some("B"), "one");
        let c = participant("Cris", Some("B"), "two");
        let d = participant("Dora", Some("C"), "two");

        let forward = solos(&group(&[a.clone(), b.clone(), c.clone(), d.clone()]));
        let reversed = solos(&group(&[d, c, b, a]));
        assert_eq!(forward, vec!["A".to_string(), "C".to_string()]);
        assert_eq!(reversed, forward);
    }

    #[test]
    fn test_bracket_groups_exclude_solos() {
        let groups = group(&[
            participant("Ana", Some("A"), "one"),
            participant("Bea", Some("B"), "one"),
            participant("Cris", Some("B"), "one"),
        ]);
        let brackets: Vec<_> = groups.bracket_groups().map(|g| g.key.as_str()).collect();
        assert_eq!(brackets, vec!["B"]);
    }

    #[test]
    fn test_deduplicate_normalizes_case_and_whitespace() {
        let mut dup = participant("  ana ", Some("A"), "two");
        dup.academy = Some("dga ".to_string());
        let other_key = participant("Ana", Some("B"), "two");
        let entries = vec![participant("Ana", Some("A"), "one"), dup, other_key];

        let unique = deduplicate(&entries);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source_id, "one");
        assert_eq!(unique[1].category_key.as_deref(), Some("B"));
    }

    #[test]
    fn test_summary_counts() {
        let participants = vec![
            participant("Ana", Some("A"), "one"),
            participant("Bea", Some("B"), "one"),
            participant("Cris", Some("B"), "one"),
            participant("Dora", None, "one"),
        ];
        let groups = group(&participants);
        let summary = TournamentSummary::new(&participants, &groups);

        assert_eq!(summary.total_participants, 4);
        assert_eq!(summary.categorized, 3);
        assert_eq!(summary.excluded, 1);
        // Excluded participants are left out of the distributions
        assert_eq!(summary.by_level.get(&Level::Festival), Some(&3));
        assert_eq!(summary.by_gender.get(&Gender::Femenino), Some(&3));
        assert_eq!(
            summary.top_categories,
            vec![("B".to_string(), 2), ("A".to_string(), 1)]
        );
        assert_eq!(summary.solos, vec!["A".to_string()]);
        assert_eq!(summary.brackets, vec!["B".to_string()]);

        let text = summary.to_string();
        assert!(text.contains("Total participants: 4"));
        assert!(text.contains("FEMENINO: 3 participants"));
        assert!(text.contains("- A\n"));
    }
}
