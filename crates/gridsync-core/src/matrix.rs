//! The declared version matrix.
//!
//! Maps each interpreter version to the numeric-library versions tested
//! against it, designates one (interpreter, library) pair as the "main"
//! environment, and carries the package lists installed during provisioning.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The numeric-library package the matrix pins. Environment names embed it.
pub const LIBRARY_PACKAGE: &str = "numpy";

/// A declared numeric-library version.
///
/// `FromSource` is the "dev" cell of the matrix: nothing is preinstalled and
/// a downstream build step compiles the library from source control.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LibraryVersion {
    Concrete(String),
    FromSource,
}

impl LibraryVersion {
    /// Pip-style version pin for this library, constrained to the declared
    /// minor series: `>= v, < next minor`. `FromSource` cells have no pin.
    pub fn pin_specifier(&self, package: &str) -> Option<String> {
        match self {
            LibraryVersion::Concrete(v) => {
                let upper = next_minor(v)?;
                Some(format!("{package}>={v},<{upper}"))
            }
            LibraryVersion::FromSource => None,
        }
    }

    pub fn is_concrete(&self) -> bool {
        matches!(self, LibraryVersion::Concrete(_))
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryVersion::Concrete(v) => write!(f, "{v}"),
            LibraryVersion::FromSource => write!(f, "DEV"),
        }
    }
}

impl TryFrom<String> for LibraryVersion {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        if value.eq_ignore_ascii_case("dev") {
            Ok(LibraryVersion::FromSource)
        } else if value.is_empty() {
            Err("library version must not be empty".to_string())
        } else {
            Ok(LibraryVersion::Concrete(value))
        }
    }
}

impl From<LibraryVersion> for String {
    fn from(value: LibraryVersion) -> Self {
        match value {
            LibraryVersion::Concrete(v) => v,
            LibraryVersion::FromSource => "dev".to_string(),
        }
    }
}

impl Ord for LibraryVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // FromSource sorts after every concrete version
        match (self, other) {
            (LibraryVersion::Concrete(a), LibraryVersion::Concrete(b)) => {
                version_key(a).cmp(&version_key(b))
            }
            (LibraryVersion::Concrete(_), LibraryVersion::FromSource) => std::cmp::Ordering::Less,
            (LibraryVersion::FromSource, LibraryVersion::Concrete(_)) => {
                std::cmp::Ordering::Greater
            }
            (LibraryVersion::FromSource, LibraryVersion::FromSource) => std::cmp::Ordering::Equal,
        }
    }
}

impl PartialOrd for LibraryVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The declared (interpreter × library) version matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionMatrix {
    /// Interpreter version → library versions tested against it, as declared.
    pub versions: BTreeMap<String, Vec<LibraryVersion>>,
    /// The single designated main pair, used for docs/coverage beyond testing.
    pub main: (String, LibraryVersion),
    /// Packages installed into every environment.
    #[serde(default)]
    pub common_packages: Vec<String>,
    /// Packages installed only into the main environment.
    #[serde(default)]
    pub main_packages: Vec<String>,
}

impl VersionMatrix {
    /// Check the matrix invariants. Called at startup, before any external
    /// call is made on its behalf.
    pub fn validate(&self) -> Result<()> {
        for (interp, libs) in &self.versions {
            if parse_version(interp).is_none() {
                return Err(Error::InvalidMatrix(format!(
                    "interpreter version {interp:?} is not a dotted numeric version"
                )));
            }
            for lib in libs {
                if let LibraryVersion::Concrete(v) = lib {
                    if parse_version(v).is_none() {
                        return Err(Error::InvalidMatrix(format!(
                            "library version {v:?} for interpreter {interp} \
                             is not a dotted numeric version"
                        )));
                    }
                }
            }
        }

        let (interp, lib) = &self.main;
        let declared = self
            .versions
            .get(interp)
            .is_some_and(|libs| libs.contains(lib));
        if !declared {
            return Err(Error::InvalidMatrix(format!(
                "main pair ({interp}, {lib}) is not declared in the matrix"
            )));
        }
        Ok(())
    }

    /// Interpreter versions in ascending version order (`3.10` after `3.2`).
    pub fn interpreters(&self) -> Vec<&str> {
        let mut interps: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        interps.sort_by_key(|v| version_key(v));
        interps
    }

    /// Library versions declared for an interpreter, in declared order.
    pub fn libraries_for(&self, interpreter: &str) -> &[LibraryVersion] {
        self.versions.get(interpreter).map_or(&[], Vec::as_slice)
    }

    /// Every declared (interpreter, library) pair: interpreters ascending,
    /// libraries in declared order. This is the matrix's natural iteration
    /// order and is stable across runs.
    pub fn declared_pairs(&self) -> Vec<(&str, &LibraryVersion)> {
        let mut pairs = Vec::new();
        for interp in self.interpreters() {
            for lib in self.libraries_for(interp) {
                pairs.push((interp, lib));
            }
        }
        pairs
    }

    /// Like [`declared_pairs`](Self::declared_pairs), but with libraries
    /// sorted ascending (`FromSource` last) within each interpreter. The
    /// reconciler visits environments in this order.
    pub fn sorted_pairs(&self) -> Vec<(&str, &LibraryVersion)> {
        let mut pairs = Vec::new();
        for interp in self.interpreters() {
            let mut libs: Vec<&LibraryVersion> = self.libraries_for(interp).iter().collect();
            libs.sort();
            pairs.extend(libs.into_iter().map(|lib| (interp, lib)));
        }
        pairs
    }

    /// The union of all declared concrete library versions, deduplicated and
    /// sorted ascending. `FromSource` cells are excluded.
    pub fn concrete_library_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self
            .versions
            .values()
            .flatten()
            .filter_map(|lib| match lib {
                LibraryVersion::Concrete(v) => Some(v.as_str()),
                LibraryVersion::FromSource => None,
            })
            .collect();
        versions.sort_by_key(|v| version_key(v));
        versions.dedup();
        versions
    }

    /// Whether a pair is the designated main pair. Plain pair equality.
    pub fn is_main(&self, interpreter: &str, lib: &LibraryVersion) -> bool {
        self.main.0 == interpreter && self.main.1 == *lib
    }

    /// Deterministic environment name for a matrix cell.
    pub fn env_name(interpreter: &str, lib: &LibraryVersion) -> String {
        format!("env{interpreter}-{LIBRARY_PACKAGE}{lib}")
    }

    /// Environment name of the main pair.
    pub fn main_env_name(&self) -> String {
        Self::env_name(&self.main.0, &self.main.1)
    }
}

/// Numeric sort key for a dotted version string. Unparsable components sort
/// as zero, which only matters for input that `validate` already rejects.
pub fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}

fn parse_version(version: &str) -> Option<Vec<u64>> {
    version
        .split('.')
        .map(|part| part.parse().ok())
        .collect()
}

/// The next minor series after `version`: bump the last component by one.
fn next_minor(version: &str) -> Option<String> {
    let (prefix, last) = match version.rsplit_once('.') {
        Some((prefix, last)) => (Some(prefix), last),
        None => (None, version),
    };
    let bumped = last.parse::<u64>().ok()? + 1;
    match prefix {
        Some(prefix) => Some(format!("{prefix}.{bumped}")),
        None => Some(bumped.to_string()),
    }
}
