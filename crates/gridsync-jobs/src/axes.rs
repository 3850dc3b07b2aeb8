//! Axis and combination-filter computation.
//!
//! The axes enumerate each dimension's full value set; the combination
//! filter is what restricts the rectangular cross product to the pairs the
//! matrix actually declares.

use gridsync_core::matrix::VersionMatrix;
use serde::Serialize;

/// Variable name of the interpreter-version axis.
pub const INTERPRETER_AXIS: &str = "PYTHON_VER";
/// Variable name of the library-version axis.
pub const LIBRARY_AXIS: &str = "NUMPY_VER";
/// Variable name of the platform label axis.
pub const PLATFORM_AXIS: &str = "PLATFORM";

/// One axis of a multiconfig build matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axis {
    #[serde(rename = "type")]
    pub kind: AxisKind,
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AxisKind {
    #[serde(rename = "TextAxis")]
    Text,
    #[serde(rename = "LabelAxis")]
    Label,
}

/// The three axes a matrix job carries: interpreter versions ascending,
/// concrete library versions ascending (the source-built sentinel has no
/// axis value), and the single platform label.
pub fn compute_axes(matrix: &VersionMatrix, platform_label: &str) -> Vec<Axis> {
    vec![
        Axis {
            kind: AxisKind::Text,
            name: INTERPRETER_AXIS.to_string(),
            values: matrix
                .interpreters()
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        Axis {
            kind: AxisKind::Text,
            name: LIBRARY_AXIS.to_string(),
            values: matrix
                .concrete_library_versions()
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        Axis {
            kind: AxisKind::Label,
            name: PLATFORM_AXIS.to_string(),
            values: vec![platform_label.to_string()],
        },
    ]
}

/// Boolean expression accepting exactly the declared (interpreter, library)
/// pairs, source-built cells excluded. Disjunct order follows the matrix's
/// natural iteration order, so repeated runs produce identical text.
pub fn compute_combination_filter(matrix: &VersionMatrix) -> String {
    let disjuncts: Vec<String> = matrix
        .declared_pairs()
        .into_iter()
        .filter(|(_, lib)| lib.is_concrete())
        .map(|(interp, lib)| {
            format!("({INTERPRETER_AXIS} == \"{interp}\" && {LIBRARY_AXIS} == \"{lib}\")")
        })
        .collect();

    if disjuncts.is_empty() {
        // No declared pair may run; an empty expression would accept
        // everything instead.
        return "(false)".to_string();
    }
    format!("({})", disjuncts.join(" || "))
}
