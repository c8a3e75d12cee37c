//! The app catalog: an opaque data source of launchable application records.
//!
//! Loaded from a JSON file when one is configured; any load or parse failure
//! degrades to the compiled-in list with a log line, never an error surface.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bus::AppRef;
use crate::error::ShellError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRecord {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub icon: String,
}

impl AppRecord {
    pub fn app_ref(&self) -> AppRef {
        AppRef::new(self.name.clone(), self.icon.clone())
    }
}

pub fn load_catalog(path: &Path) -> Result<Vec<AppRecord>, ShellError> {
    let contents = fs::read_to_string(path).map_err(|source| ShellError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<AppRecord> =
        serde_json::from_str(&contents).map_err(|source| ShellError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(records)
}

/// Load the catalog from `path` when given, falling back to the built-in
/// list on any failure.
pub fn load_or_builtin(path: Option<&Path>) -> Vec<AppRecord> {
    match path {
        Some(path) => match load_catalog(path) {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "app catalog is empty; using built-in list");
                builtin_catalog()
            }
            Err(err) => {
                tracing::warn!(%err, "falling back to built-in app catalog");
                builtin_catalog()
            }
        },
        None => builtin_catalog(),
    }
}

pub fn builtin_catalog() -> Vec<AppRecord> {
    let record = |name: &str, category: &str, company: &str, icon: &str| AppRecord {
        name: name.to_string(),
        category: category.to_string(),
        company: company.to_string(),
        icon: icon.to_string(),
    };
    vec![
        record("Photoshop", "Graphics", "Adobe", "Ps"),
        record("Revit", "BIM", "Autodesk", "Rv"),
        record("AutoCAD", "CAD", "Autodesk", "Ac"),
        record("Rhino", "Modeling", "McNeel", "Rh"),
        record("Blender", "Modeling", "Blender Foundation", "Bl"),
        record("Unreal Engine", "Realtime", "Epic Games", "Ue"),
        record("Grasshopper", "Parametric", "McNeel", "Gh"),
        record("SketchUp", "Modeling", "Trimble", "Sk"),
    ]
}
