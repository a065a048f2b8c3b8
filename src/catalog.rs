use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Schools and the departments offered for each, in display order.
const BUILTIN: &[(&str, &[&str])] = &[(
    "SEAS",
    &[
        "Biomedical Engineering",
        "Chemical Engineering",
        "Civil and Environmental Engineering",
        "Computer Engineering",
        "Computer Science",
        "Electrical and Computer Engineering",
        "Engineering and Society",
        "Materials Science and Engineering",
        "Mechanical and Aerospace Engineering",
        "Systems and Information Engineering",
    ],
)];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only school -> department lookup, built once at startup and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    schools: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub fn builtin() -> Catalog {
        Catalog {
            schools: BUILTIN
                .iter()
                .map(|(school, departments)| {
                    (
                        school.to_string(),
                        departments.iter().map(|d| d.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Parses `{"SEAS": ["Biomedical Engineering", ...], ...}`.
    pub fn from_json_str(json: &str) -> serde_json::Result<Catalog> {
        let schools = serde_json::from_str(json)?;
        Ok(Catalog { schools })
    }

    pub fn from_json_file(path: &Path) -> Result<Catalog, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise the builtin table.
    pub fn load(path: Option<&Path>) -> Result<Catalog, CatalogError> {
        match path {
            Some(path) => {
                let catalog = Self::from_json_file(path)?;
                tracing::info!(
                    "loaded catalog from {:?} ({} schools)",
                    path,
                    catalog.schools.len()
                );
                Ok(catalog)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn schools(&self) -> impl Iterator<Item = &str> {
        self.schools.keys().map(String::as_str)
    }

    /// Departments of `school`; unknown schools have none.
    pub fn departments(&self, school: &str) -> &[String] {
        self.schools
            .get(school)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn all_departments(&self) -> Vec<&str> {
        self.schools
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
