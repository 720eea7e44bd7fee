//! Grade catalogue for gradekey.
//!
//! Grades are the purchasable tiers an operator can issue codes for. The
//! derivation itself treats a grade as an opaque string; the catalogue only
//! exists so the operator tool can refuse typos. An empty catalogue accepts
//! every grade.
//!
//! # Configuration
//!
//! ```toml
//! [grades.basic]
//! label = "Basic"
//!
//! [grades.gold]
//! label = "Gold"
//! description = "Lifetime gold tier"
//! ```

use serde::Deserialize;
use std::collections::HashMap;

use crate::config::get_config;

/// Configuration for a single grade.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GradeConfig {
    /// Human readable name shown to operators
    pub label: Option<String>,
    /// Free-form description
    pub description: Option<String>,
}

/// A grade with its name included.
#[derive(Debug, Clone)]
pub struct Grade {
    /// The grade name as typed by operators (e.g. "basic", "gold")
    pub name: String,
    /// The grade configuration
    pub config: GradeConfig,
}

impl Grade {
    /// The label, falling back to the grade name.
    pub fn label(&self) -> &str {
        self.config.label.as_deref().unwrap_or(&self.name)
    }
}

/// A set of grades, usually taken from the global configuration.
#[derive(Debug, Clone, Default)]
pub struct GradeCatalogue {
    grades: HashMap<String, GradeConfig>,
}

impl GradeCatalogue {
    pub fn new(grades: HashMap<String, GradeConfig>) -> Self {
        Self { grades }
    }

    /// Catalogue built from the global configuration (empty if it cannot load).
    pub fn from_config() -> Self {
        get_config()
            .map(|c| Self::new(c.grades.clone()))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }

    /// Look up a grade by exact name.
    pub fn get(&self, name: &str) -> Option<Grade> {
        self.grades.get(name).map(|config| Grade {
            name: name.to_string(),
            config: config.clone(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.grades.contains_key(name)
    }

    /// Whether `name` may be issued: always true for an empty catalogue.
    pub fn accepts(&self, name: &str) -> bool {
        self.is_empty() || self.contains(name)
    }

    /// All grades, sorted by name.
    pub fn all(&self) -> Vec<Grade> {
        let mut grades: Vec<Grade> = self
            .grades
            .iter()
            .map(|(name, config)| Grade {
                name: name.clone(),
                config: config.clone(),
            })
            .collect();
        grades.sort_by(|a, b| a.name.cmp(&b.name));
        grades
    }

    /// All grade names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.all().into_iter().map(|g| g.name).collect()
    }
}

/// Get a grade from the global configuration.
pub fn get_grade(name: &str) -> Option<Grade> {
    GradeCatalogue::from_config().get(name)
}

/// Check if a grade exists in the global configuration.
pub fn grade_exists(name: &str) -> bool {
    get_grade(name).is_some()
}

/// Get all configured grade names, sorted.
pub fn all_grade_names() -> Vec<String> {
    GradeCatalogue::from_config().names()
}
