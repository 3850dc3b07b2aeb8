//! Job configuration document rewriting.
//!
//! A job's configuration is an order-preserving JSON object. The rewrite is
//! a pure function: snapshot in, new document out. Only the two managed
//! fields are touched; every other top-level field passes through unchanged
//! and in its original position.

use crate::axes::{compute_axes, compute_combination_filter};
use gridsync_core::matrix::VersionMatrix;
use gridsync_core::{Error, Result};
use serde_json::Value;

/// Key holding the list of build axes.
pub const AXES_KEY: &str = "axes";
/// Key holding the combination-filter expression.
pub const FILTER_KEY: &str = "combinationFilter";

/// Produce a new document with the managed fields recomputed from the
/// matrix. Existing `axes`/`combinationFilter` entries are dropped (their
/// absence is fine, first-time setup), and fresh ones are appended at the
/// end of the object, axes first.
pub fn update_document(
    document: &Value,
    matrix: &VersionMatrix,
    platform_label: &str,
) -> Result<Value> {
    let fields = document
        .as_object()
        .ok_or_else(|| Error::InvalidDocument("document root is not an object".to_string()))?;

    let mut updated = fields.clone();
    updated.shift_remove(AXES_KEY);
    updated.shift_remove(FILTER_KEY);
    updated.insert(
        AXES_KEY.to_string(),
        serde_json::to_value(compute_axes(matrix, platform_label))?,
    );
    updated.insert(
        FILTER_KEY.to_string(),
        Value::String(compute_combination_filter(matrix)),
    );

    Ok(Value::Object(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridsync_core::matrix::LibraryVersion;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn scenario_matrix() -> VersionMatrix {
        let mut versions = BTreeMap::new();
        versions.insert(
            "2.7".to_string(),
            vec![
                LibraryVersion::Concrete("1.6".to_string()),
                LibraryVersion::Concrete("1.7".to_string()),
                LibraryVersion::FromSource,
            ],
        );
        VersionMatrix {
            versions,
            main: (
                "2.7".to_string(),
                LibraryVersion::Concrete("1.7".to_string()),
            ),
            common_packages: vec![],
            main_packages: vec![],
        }
    }

    #[test]
    fn appends_managed_fields_on_first_time_setup() {
        let document = json!({
            "description": "nightly grid",
            "builders": [{"shell": "run-tests"}]
        });

        let updated = update_document(&document, &scenario_matrix(), "debian6").unwrap();
        let keys: Vec<&String> = updated.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["description", "builders", "axes", "combinationFilter"]);
    }

    #[test]
    fn replaces_existing_managed_fields() {
        let document = json!({
            "axes": [{"type": "TextAxis", "name": "PYTHON_VER", "values": ["2.5"]}],
            "description": "nightly grid",
            "combinationFilter": "(true)",
            "triggers": {"cron": "@daily"}
        });

        let updated = update_document(&document, &scenario_matrix(), "debian6").unwrap();
        let fields = updated.as_object().unwrap();

        let keys: Vec<&String> = fields.keys().collect();
        assert_eq!(keys, vec!["description", "triggers", "axes", "combinationFilter"]);

        assert_eq!(
            fields["axes"],
            json!([
                {"type": "TextAxis", "name": "PYTHON_VER", "values": ["2.7"]},
                {"type": "TextAxis", "name": "NUMPY_VER", "values": ["1.6", "1.7"]},
                {"type": "LabelAxis", "name": "PLATFORM", "values": ["debian6"]}
            ])
        );
        assert_eq!(
            fields["combinationFilter"],
            json!(
                "((PYTHON_VER == \"2.7\" && NUMPY_VER == \"1.6\") || \
                 (PYTHON_VER == \"2.7\" && NUMPY_VER == \"1.7\"))"
            )
        );
    }

    #[test]
    fn passes_unrelated_fields_through_unchanged() {
        let document = json!({
            "description": "nightly grid",
            "builders": [{"shell": "run-tests"}],
            "axes": [],
            "publishers": {"email": "ci@example.org"},
            "combinationFilter": "stale"
        });

        let updated = update_document(&document, &scenario_matrix(), "debian6").unwrap();
        let fields = updated.as_object().unwrap();
        assert_eq!(fields["description"], document["description"]);
        assert_eq!(fields["builders"], document["builders"]);
        assert_eq!(fields["publishers"], document["publishers"]);
    }

    #[test]
    fn input_document_is_not_mutated() {
        let document = json!({"axes": "old", "x": 1});
        let _ = update_document(&document, &scenario_matrix(), "debian6").unwrap();
        assert_eq!(document, json!({"axes": "old", "x": 1}));
    }

    #[test]
    fn serialization_is_deterministic() {
        let document = json!({"b": 2, "a": 1});
        let matrix = scenario_matrix();
        let first = serde_json::to_string(&update_document(&document, &matrix, "debian6").unwrap())
            .unwrap();
        let second =
            serde_json::to_string(&update_document(&document, &matrix, "debian6").unwrap())
                .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn non_object_root_is_rejected() {
        let err = update_document(&json!([1, 2]), &scenario_matrix(), "debian6").unwrap_err();
        assert!(matches!(err, Error::InvalidDocument(_)));
    }
}
