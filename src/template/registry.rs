//! Registry of bracket templates keyed by entrant count

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::bracket::Point;
use crate::renderer::Backdrop;

/// Errors that can occur when loading templates
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read template file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse template TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Two templates declared for the same entrant count
    #[error("duplicate template for {participants} participants")]
    Duplicate { participants: usize },

    #[error("template for {participants} participants has a non-positive size")]
    InvalidSize { participants: usize },

    /// Neither slot nor line markers were declared
    #[error("template for {participants} participants declares no markers")]
    NoMarkers { participants: usize },

    #[error("error reading template image {path}: {message}")]
    ImageRead { path: PathBuf, message: String },
}

/// One pre-drawn bracket sheet with its detected markers
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateSpec {
    pub participants: usize,
    pub width: f64,
    pub height: f64,
    /// Backdrop image, resolved against the registry file's directory
    pub image: Option<PathBuf>,
    pub slot_markers: Vec<Point>,
    pub line_markers: Vec<Point>,
}

impl TemplateSpec {
    /// Read the backdrop image, if the template names one
    pub fn load_backdrop(&self) -> Result<Option<Backdrop>, TemplateError> {
        let Some(path) = &self.image else {
            return Ok(None);
        };
        let data = std::fs::read(path).map_err(|e| TemplateError::ImageRead {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(Backdrop::new(
            mime_for(path),
            data,
            self.width,
            self.height,
        )))
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("svg") => "image/svg+xml",
        _ => "image/png",
    }
}

#[derive(Deserialize)]
struct TomlTemplates {
    #[serde(default)]
    template: Vec<TomlTemplate>,
}

#[derive(Deserialize)]
struct TomlTemplate {
    participants: usize,
    width: f64,
    height: f64,
    image: Option<PathBuf>,
    #[serde(default)]
    slot_markers: Vec<[f64; 2]>,
    #[serde(default)]
    line_markers: Vec<[f64; 2]>,
}

/// Templates keyed by the number of entrants they hold
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<usize, TemplateSpec>,
}

impl TemplateRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load templates from a TOML file; image paths are relative to it
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&content, Some(base))
    }

    /// Load templates from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, TemplateError> {
        Self::parse(content, None)
    }

    fn parse(content: &str, base: Option<&Path>) -> Result<Self, TemplateError> {
        let parsed: TomlTemplates = toml::from_str(content)?;
        let mut registry = Self::new();
        for raw in parsed.template {
            let to_points = |markers: Vec<[f64; 2]>| -> Vec<Point> {
                markers.into_iter().map(|[x, y]| Point::new(x, y)).collect()
            };
            let image = raw.image.map(|image| match base {
                Some(base) if image.is_relative() => base.join(image),
                _ => image,
            });
            registry.register(TemplateSpec {
                participants: raw.participants,
                width: raw.width,
                height: raw.height,
                image,
                slot_markers: to_points(raw.slot_markers),
                line_markers: to_points(raw.line_markers),
            })?;
        }
        Ok(registry)
    }

    /// Add a template, rejecting a second one for the same count
    pub fn register(&mut self, spec: TemplateSpec) -> Result<(), TemplateError> {
        let participants = spec.participants;
        if spec.width <= 0.0 || spec.height <= 0.0 {
            return Err(TemplateError::InvalidSize { participants });
        }
        if spec.slot_markers.is_empty() && spec.line_markers.is_empty() {
            return Err(TemplateError::NoMarkers { participants });
        }
        if self.templates.contains_key(&participants) {
            return Err(TemplateError::Duplicate { participants });
        }
        self.templates.insert(participants, spec);
        Ok(())
    }

    pub fn get(&self, participants: usize) -> Option<&TemplateSpec> {
        self.templates.get(&participants)
    }

    /// Entrant counts with a template, ascending
    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.templates.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
