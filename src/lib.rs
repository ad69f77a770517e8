//! Bracket Draw - competitor categorization and single-elimination draws
//!
//! Rows from heterogeneous registration sheets are normalized, resolved to
//! official category keys, grouped, and every category with two or more
//! competitors gets a seeding tree and a drawable layout.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use bracket_draw::{CategoryCatalog, Pipeline, PipelineConfig, RawRecord, SourceTable};
//! use chrono::NaiveDate;
//!
//! let columns = ["Nombre", "Nacimiento", "Sexo", "Kup", "Peso"]
//!     .iter()
//!     .map(|c| c.to_string())
//!     .collect();
//! let row = |name: &str| {
//!     RawRecord::new()
//!         .with("Nombre", name)
//!         .with("Nacimiento", "2015-03-01")
//!         .with("Sexo", "M")
//!         .with("Kup", "8")
//!         .with("Peso", "29")
//! };
//! let source = SourceTable::from_rows("club", columns, vec![row("Leo"), row("Max")]);
//!
//! let config = PipelineConfig::new()
//!     .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
//! let pipeline = Pipeline::new(Arc::new(CategoryCatalog::default()), config);
//! let report = pipeline.run(&[source]);
//!
//! assert_eq!(report.brackets.len(), 1);
//! assert_eq!(report.brackets[0].key, "Festival INFANTIL B MASCULINO -30");
//! ```

pub mod bracket;
pub mod catalog;
pub mod category;
pub mod error;
pub mod group;
pub mod logging;
pub mod normalize;
pub mod renderer;
pub mod source;
pub mod template;

pub use bracket::{BracketConfig, BracketEngine, BracketLayout, DrawNode, Entrant, LayoutBackend};
pub use catalog::{CatalogError, CategoryCatalog, Gender, Level};
pub use category::{CategoryResolver, ExclusionReason};
pub use error::Error;
pub use group::{deduplicate, group, solos, CategoryGroups, TournamentSummary};
pub use normalize::{LogicalField, NormalizeError, NormalizedParticipant, RecordNormalizer};
pub use renderer::{render_svg, SvgConfig};
pub use source::{RawRecord, SourceError, SourceTable};
pub use template::{TemplateConfig, TemplateMarkerEngine, TemplateRegistry};

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use renderer::render_svg_with_backdrop;

/// Configuration for the complete pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Date ages are computed against
    pub reference_date: NaiveDate,
    /// Drop rows whose modality is not a sparring event
    pub modality_filter: bool,
    /// Bracket geometry
    pub bracket: BracketConfig,
    /// SVG output configuration
    pub svg: SvgConfig,
    /// Label placement on templates
    pub template: TemplateConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_date: chrono::Local::now().date_naive(),
            modality_filter: true,
            bracket: BracketConfig::default(),
            svg: SvgConfig::default(),
            template: TemplateConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    /// Enable or disable the modality filter
    pub fn with_modality_filter(mut self, enabled: bool) -> Self {
        self.modality_filter = enabled;
        self
    }

    /// Set the bracket geometry
    pub fn with_bracket(mut self, config: BracketConfig) -> Self {
        self.bracket = config;
        self
    }

    /// Set the SVG configuration
    pub fn with_svg(mut self, config: SvgConfig) -> Self {
        self.svg = config;
        self
    }

    pub fn with_template(mut self, config: TemplateConfig) -> Self {
        self.template = config;
        self
    }
}

/// A source that could not be processed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub source_id: String,
    pub message: String,
    /// Required logical fields without a column; empty for read failures
    pub missing: Vec<LogicalField>,
    /// Columns the source declared
    pub found: Vec<String>,
}

/// Which sources made it through normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<SourceFailure>,
}

impl SourceReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Which layout backend produced a bracket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Geometry,
    Template,
}

/// Draw of one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBracket {
    pub key: String,
    pub entrants: Vec<Entrant>,
    /// Seeding tree; absent for a single-entry bracket
    pub tree: Option<DrawNode>,
    pub layout: BracketLayout,
    pub backend: Backend,
}

impl CategoryBracket {
    /// File name stem for exported artifacts
    pub fn file_stem(&self) -> String {
        let key: String = self
            .key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '+' { c } else { '_' })
            .collect();
        format!("bracket_{}", key)
    }
}

/// Everything produced by one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct TournamentReport {
    pub sources: SourceReport,
    pub participants: Vec<NormalizedParticipant>,
    /// Keys built from row data that the catalog does not list
    pub invalid_keys: Vec<String>,
    #[serde(skip)]
    pub groups: CategoryGroups,
    pub solos: Vec<String>,
    pub brackets: Vec<CategoryBracket>,
    pub summary: TournamentSummary,
}

impl TournamentReport {
    /// Participants that ended up without a category
    pub fn excluded(&self) -> impl Iterator<Item = &NormalizedParticipant> {
        self.participants.iter().filter(|p| p.category_key.is_none())
    }
}

/// One bracket of a manual request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManualBracket {
    pub category: String,
    pub participants: Vec<Entrant>,
}

/// Brackets entered by hand, as JSON:
/// `{"brackets": [{"category": "...", "participants": [{"name": "...", "academy": "..."}]}]}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManualRequest {
    pub brackets: Vec<ManualBracket>,
}

impl ManualRequest {
    pub fn from_json(content: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Runs normalization, resolution, grouping and layout over a batch of sources
#[derive(Debug, Clone)]
pub struct Pipeline {
    resolver: CategoryResolver,
    engine: BracketEngine,
    templates: Option<TemplateMarkerEngine>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(catalog: Arc<CategoryCatalog>, config: PipelineConfig) -> Self {
        Self {
            resolver: CategoryResolver::new(catalog),
            engine: BracketEngine::new(config.bracket.clone()),
            templates: None,
            config,
        }
    }

    /// Prefer templates for entrant counts that have one
    pub fn with_templates(mut self, registry: Arc<TemplateRegistry>) -> Self {
        self.templates = Some(
            TemplateMarkerEngine::new(registry)
                .with_config(self.config.template.clone())
                .with_label_limit(self.config.bracket.label_limit),
        );
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &CategoryResolver {
        &self.resolver
    }

    /// Process sources in the order given
    pub fn run(&self, sources: &[SourceTable]) -> TournamentReport {
        self.run_with_failures(sources, Vec::new())
    }

    /// Read CSV files and process them; unreadable files are reported as
    /// failed sources
    pub fn run_paths(&self, paths: &[PathBuf]) -> TournamentReport {
        let mut sources = Vec::with_capacity(paths.len());
        let mut failures = Vec::new();
        for path in paths {
            match SourceTable::from_csv_path(path) {
                Ok(source) => sources.push(source),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "source unreadable");
                    failures.push(SourceFailure {
                        source_id: path.display().to_string(),
                        message: e.to_string(),
                        missing: vec![],
                        found: vec![],
                    });
                }
            }
        }
        self.run_with_failures(&sources, failures)
    }

    fn run_with_failures(
        &self,
        sources: &[SourceTable],
        failed: Vec<SourceFailure>,
    ) -> TournamentReport {
        let normalizer = RecordNormalizer::new(self.config.reference_date)
            .with_modality_filter(self.config.modality_filter);

        let mut report = SourceReport {
            succeeded: vec![],
            failed,
        };
        let mut participants = Vec::new();
        for source in sources {
            match normalizer.normalize_source(source) {
                Ok(normalized) => {
                    report.succeeded.push(normalized.source_id);
                    participants.extend(normalized.participants);
                }
                Err(e) => report.failed.push(SourceFailure {
                    source_id: source.id.clone(),
                    message: e.to_string(),
                    missing: e.missing().to_vec(),
                    found: e.found().to_vec(),
                }),
            }
        }

        let invalid_keys = self.resolver.resolve_all(&mut participants);
        let groups = group(&participants);
        let solos = solos(&groups);

        let brackets: Vec<CategoryBracket> = groups
            .bracket_groups()
            .filter_map(|g| {
                let entrants: Vec<Entrant> = g.participants.iter().map(Entrant::from).collect();
                self.bracket(&g.key, entrants)
            })
            .collect();

        let summary = TournamentSummary::new(&participants, &groups);
        info!(
            participants = participants.len(),
            excluded = summary.excluded,
            categories = groups.len(),
            solos = solos.len(),
            brackets = brackets.len(),
            "tournament processed"
        );

        TournamentReport {
            sources: report,
            participants,
            invalid_keys,
            groups,
            solos,
            brackets,
            summary,
        }
    }

    /// Build brackets from manually entered lists. Repeated entries are
    /// dropped first; a list left with one entrant gets the single-box
    /// layout, an empty one is skipped.
    pub fn manual_brackets(&self, request: &ManualRequest) -> Vec<CategoryBracket> {
        request
            .brackets
            .iter()
            .filter_map(|manual| {
                let entrants = deduplicate(&manual.participants);
                if entrants.len() < manual.participants.len() {
                    info!(
                        category = %manual.category,
                        removed = manual.participants.len() - entrants.len(),
                        "duplicate entrants removed"
                    );
                }
                match entrants.len() {
                    0 => {
                        warn!(category = %manual.category, "bracket without participants skipped");
                        None
                    }
                    1 => {
                        let layout = self.engine.single(&entrants[0]);
                        Some(CategoryBracket {
                            key: manual.category.clone(),
                            entrants,
                            tree: None,
                            layout,
                            backend: Backend::Geometry,
                        })
                    }
                    _ => self.bracket(&manual.category, entrants),
                }
            })
            .collect()
    }

    /// Seeding tree plus a layout, from a template when one fits
    fn bracket(&self, key: &str, entrants: Vec<Entrant>) -> Option<CategoryBracket> {
        let draw = self.engine.draw(&entrants)?;
        let template_layout = self
            .templates
            .as_ref()
            .and_then(|templates| templates.layout(&entrants));

        let (layout, backend) = match template_layout {
            Some(layout) => (layout, Backend::Template),
            None => (draw.layout, Backend::Geometry),
        };
        Some(CategoryBracket {
            key: key.to_string(),
            entrants,
            tree: Some(draw.tree),
            layout,
            backend,
        })
    }

    /// SVG for one bracket; template brackets are drawn over their sheet
    pub fn render(&self, bracket: &CategoryBracket) -> Result<String, Error> {
        let backdrop = match (bracket.backend, &self.templates) {
            (Backend::Template, Some(templates)) => templates
                .template_for(bracket.entrants.len())
                .map(|spec| spec.load_backdrop())
                .transpose()?
                .flatten(),
            _ => None,
        };
        Ok(render_svg_with_backdrop(
            &bracket.layout,
            Some(&bracket.key),
            backdrop.as_ref(),
            &self.config.svg,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        let config = PipelineConfig::new()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        Pipeline::new(Arc::new(CategoryCatalog::default()), config)
    }

    #[test]
    fn test_manual_request_parse() {
        let request = ManualRequest::from_json(
            r#"{"brackets":[{"category":"Festival MAYORES MASCULINO -54","participants":[{"name":"Leo","academy":"DGA"},{"name":"Max"}]}]}"#,
        )
        .unwrap();
        assert_eq!(request.brackets[0].participants.len(), 2);
        assert_eq!(request.brackets[0].participants[1].academy, None);
    }

    #[test]
    fn test_manual_request_invalid_json() {
        let err = ManualRequest::from_json("{\"brackets\": 3}").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_manual_brackets_dedup_and_single() {
        let request = ManualRequest {
            brackets: vec![
                ManualBracket {
                    category: "A".to_string(),
                    participants: vec![
                        Entrant::new("Leo", Some("DGA".to_string())),
                        Entrant::new(" leo ", Some("dga".to_string())),
                    ],
                },
                ManualBracket {
                    category: "B".to_string(),
                    participants: vec![
                        Entrant::new("Ana", None),
                        Entrant::new("Bea", None),
                        Entrant::new("Cris", None),
                    ],
                },
                ManualBracket {
                    category: "C".to_string(),
                    participants: vec![],
                },
            ],
        };
        let brackets = pipeline().manual_brackets(&request);
        assert_eq!(brackets.len(), 2);

        assert_eq!(brackets[0].entrants.len(), 1);
        assert!(brackets[0].tree.is_none());
        assert_eq!(brackets[0].layout.boxes.len(), 1);
        assert!(brackets[0].layout.connectors.is_empty());

        assert_eq!(brackets[1].layout.bye_count(), 1);
        assert_eq!(brackets[1].backend, Backend::Geometry);
    }

    #[test]
    fn test_file_stem() {
        let bracket = CategoryBracket {
            key: "Festival INFANTIL C FEMENINO -29".to_string(),
            entrants: vec![],
            tree: None,
            layout: BracketLayout::new(vec![], vec![]),
            backend: Backend::Geometry,
        };
        assert_eq!(bracket.file_stem(), "bracket_Festival_INFANTIL_C_FEMENINO_-29");
    }

    #[test]
    fn test_render_geometry_bracket() {
        let request = ManualRequest {
            brackets: vec![ManualBracket {
                category: "Festival MAYORES MASCULINO -54".to_string(),
                participants: vec![Entrant::new("Leo", None), Entrant::new("Max", None)],
            }],
        };
        let p = pipeline();
        let brackets = p.manual_brackets(&request);
        let svg = p.render(&brackets[0]).unwrap();
        assert!(svg.contains("Festival MAYORES MASCULINO -54"));
        assert!(svg.contains("Leo"));
    }
}
