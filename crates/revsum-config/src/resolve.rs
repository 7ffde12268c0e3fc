//! Configuration resolution.
//!
//! Turns [`Settings`] into an immutable [`ResolvedConfig`]. The volumes flag is
//! normalized first, then storage paths are derived from the normalized value:
//! with Unity Catalog disabled a session always gets the legacy `/dbfs` paths,
//! whatever `use_volumes` says.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::identifier::Identifier;
use crate::sampling::Sampling;
use crate::settings::Settings;
use crate::validate::{validate_settings, ValidationError};

/// Settings failed validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid settings: {}", join_errors(.errors))]
pub struct ResolveError {
    pub errors: Vec<ValidationError>,
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ResolveError> for revsum_common::Error {
    fn from(err: ResolveError) -> Self {
        revsum_common::Error::InvalidSettings(join_errors(&err.errors))
    }
}

/// Derived storage roots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoragePaths {
    /// Root for bulk file storage.
    pub storage_root: String,
    /// Root for tabular data access.
    pub data_root: String,
}

impl StoragePaths {
    /// Derive roots for a namespace. Callers pass the effective volumes flag.
    pub fn derive(catalog: &Identifier, schema: &Identifier, use_volumes: bool) -> Self {
        if use_volumes {
            let storage_root = format!("/Volumes/{}/{}", catalog, schema);
            StoragePaths {
                data_root: storage_root.clone(),
                storage_root,
            }
        } else {
            StoragePaths {
                storage_root: format!("/dbfs/{}", catalog),
                data_root: format!("/{}", catalog),
            }
        }
    }
}

/// Fully resolved session configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub catalog: Identifier,
    pub schema: Identifier,
    pub use_unity_catalog: bool,
    /// Effective volumes flag, after normalization.
    pub use_volumes: bool,
    /// True when `use_volumes` was requested but forced off.
    pub volumes_overridden: bool,
    pub paths: StoragePaths,
    pub sampling: Sampling,
}

impl ResolvedConfig {
    /// Values under the constant names downstream notebooks read.
    pub fn env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("CATALOG_NAME", self.catalog.to_string()),
            ("SCHEMA_NAME", self.schema.to_string()),
            ("USE_UC", self.use_unity_catalog.to_string()),
            ("USE_VOLUMES", self.use_volumes.to_string()),
            ("TOP_BOOK_COUNT", self.sampling.top_book_count.to_string()),
            (
                "TOP_BOOK_SAMPLING_FRACTION",
                self.sampling
                    .fraction
                    .map(|f| f.to_string())
                    .unwrap_or_default(),
            ),
            ("MAIN_STORAGE_PATH", self.paths.storage_root.clone()),
            ("MAIN_DATA_PATH", self.paths.data_root.clone()),
        ]
    }
}

/// Resolve settings into the session configuration.
pub fn resolve(settings: &Settings) -> Result<ResolvedConfig, ResolveError> {
    let validation = validate_settings(settings);
    if !validation.is_valid() {
        return Err(ResolveError {
            errors: validation.errors,
        });
    }

    let catalog = Identifier::new("catalog_name", &settings.catalog_name)
        .map_err(|e| ResolveError { errors: vec![e] })?;
    let schema = Identifier::new("schema_name", &settings.schema_name)
        .map_err(|e| ResolveError { errors: vec![e] })?;

    let use_volumes = settings.use_unity_catalog && settings.use_volumes;
    let volumes_overridden = settings.use_volumes && !use_volumes;
    if volumes_overridden {
        info!("unity catalog disabled, falling back to dbfs paths");
    }

    let paths = StoragePaths::derive(&catalog, &schema, use_volumes);
    debug!(
        storage_root = %paths.storage_root,
        data_root = %paths.data_root,
        use_volumes,
        "derived storage paths"
    );

    Ok(ResolvedConfig {
        catalog,
        schema,
        use_unity_catalog: settings.use_unity_catalog,
        use_volumes,
        volumes_overridden,
        paths,
        sampling: Sampling {
            top_book_count: settings.top_book_count,
            fraction: settings.top_book_sampling_fraction,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn settings(uc: bool, volumes: bool) -> Settings {
        Settings {
            use_unity_catalog: uc,
            use_volumes: volumes,
            ..Settings::default()
        }
    }

    #[test]
    fn volumes_paths_for_default_namespace() {
        let resolved = resolve(&settings(true, true)).unwrap();
        assert!(resolved.use_volumes);
        assert!(!resolved.volumes_overridden);
        assert_eq!(
            resolved.paths.storage_root,
            "/Volumes/juan_dev/sol_acc_review_summarisation"
        );
        assert_eq!(resolved.paths.data_root, resolved.paths.storage_root);
    }

    #[test]
    fn uc_disabled_forces_dbfs_paths() {
        let resolved = resolve(&settings(false, true)).unwrap();
        assert!(!resolved.use_volumes);
        assert!(resolved.volumes_overridden);
        assert_eq!(resolved.paths.storage_root, "/dbfs/juan_dev");
        assert_eq!(resolved.paths.data_root, "/juan_dev");
    }

    #[test]
    fn volumes_off_with_uc_uses_dbfs() {
        let resolved = resolve(&settings(true, false)).unwrap();
        assert!(!resolved.use_volumes);
        assert!(!resolved.volumes_overridden);
        assert_eq!(resolved.paths.storage_root, "/dbfs/juan_dev");
    }

    #[test]
    fn invalid_settings_rejected() {
        let bad = Settings {
            catalog_name: String::new(),
            ..Settings::default()
        };
        let err = resolve(&bad).unwrap_err();
        assert_eq!(
            err.errors,
            vec![ValidationError::EmptyIdentifier {
                field: "catalog_name"
            }]
        );
        let common: revsum_common::Error = err.into();
        assert_eq!(common.code(), 11);
    }

    #[test]
    fn absent_fraction_disables_sampling() {
        let s = Settings {
            top_book_sampling_fraction: None,
            ..Settings::default()
        };
        let resolved = resolve(&s).unwrap();
        assert!(!resolved.sampling.is_enabled());
    }

    #[test]
    fn env_pairs_use_notebook_names() {
        let resolved = resolve(&Settings::default()).unwrap();
        let pairs = resolved.env_pairs();
        assert!(pairs.contains(&(
            "MAIN_DATA_PATH",
            "/Volumes/juan_dev/sol_acc_review_summarisation".to_string()
        )));
        assert!(pairs.contains(&("TOP_BOOK_SAMPLING_FRACTION", "0.01".to_string())));
    }

    fn name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,20}"
    }

    proptest! {
        #[test]
        fn volumes_layout(catalog in name(), schema in name()) {
            let s = Settings { catalog_name: catalog.clone(), schema_name: schema.clone(), ..settings(true, true) };
            let resolved = resolve(&s).unwrap();
            prop_assert_eq!(&resolved.paths.storage_root, &format!("/Volumes/{}/{}", catalog, schema));
            prop_assert_eq!(&resolved.paths.data_root, &resolved.paths.storage_root);
        }

        #[test]
        fn dbfs_layout(catalog in name(), schema in name(), uc in any::<bool>()) {
            let s = Settings { catalog_name: catalog.clone(), schema_name: schema, ..settings(uc, false) };
            let resolved = resolve(&s).unwrap();
            prop_assert_eq!(resolved.paths.storage_root, format!("/dbfs/{}", catalog));
            prop_assert_eq!(resolved.paths.data_root, format!("/{}", catalog));
        }

        #[test]
        fn no_uc_never_uses_volumes(volumes in any::<bool>()) {
            let resolved = resolve(&settings(false, volumes)).unwrap();
            prop_assert!(!resolved.use_volumes);
        }

        #[test]
        fn resolution_is_idempotent(catalog in name(), schema in name(), uc in any::<bool>(), volumes in any::<bool>()) {
            let s = Settings { catalog_name: catalog, schema_name: schema, ..settings(uc, volumes) };
            prop_assert_eq!(resolve(&s).unwrap(), resolve(&s).unwrap());
        }
    }
}
