//! User-editable session settings.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Default Unity Catalog name.
pub const DEFAULT_CATALOG_NAME: &str = "juan_dev";

/// Default schema name.
pub const DEFAULT_SCHEMA_NAME: &str = "sol_acc_review_summarisation";

/// Default number of popular books kept downstream.
pub const DEFAULT_TOP_BOOK_COUNT: u32 = 1000;

/// Default downstream sampling fraction.
pub const DEFAULT_TOP_BOOK_SAMPLING_FRACTION: f64 = 0.01;

/// The literals a session starts from, before any derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Unity Catalog name.
    pub catalog_name: String,

    /// Schema name within the catalog.
    pub schema_name: String,

    /// Use Unity Catalog namespaces.
    pub use_unity_catalog: bool,

    /// Use volume-backed storage paths. Ignored without Unity Catalog.
    pub use_volumes: bool,

    /// How many popular books to take.
    pub top_book_count: u32,

    /// Further sampling ratio; `None` disables sampling.
    pub top_book_sampling_fraction: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_name: DEFAULT_CATALOG_NAME.to_string(),
            schema_name: DEFAULT_SCHEMA_NAME.to_string(),
            use_unity_catalog: true,
            use_volumes: true,
            top_book_count: DEFAULT_TOP_BOOK_COUNT,
            top_book_sampling_fraction: Some(DEFAULT_TOP_BOOK_SAMPLING_FRACTION),
        }
    }
}

impl Settings {
    /// Overlay every value the layer sets.
    pub fn apply(&mut self, layer: &SettingsLayer) {
        if let Some(v) = &layer.catalog_name {
            self.catalog_name = v.clone();
        }
        if let Some(v) = &layer.schema_name {
            self.schema_name = v.clone();
        }
        if let Some(v) = layer.use_unity_catalog {
            self.use_unity_catalog = v;
        }
        if let Some(v) = layer.use_volumes {
            self.use_volumes = v;
        }
        if let Some(v) = layer.top_book_count {
            self.top_book_count = v;
        }
        if let Some(v) = layer.top_book_sampling_fraction {
            self.top_book_sampling_fraction = v;
        }
    }
}

/// A partial set of settings from one configuration source.
///
/// In a settings file, an omitted key leaves the lower layer untouched while
/// `"top_book_sampling_fraction": null` explicitly disables sampling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    #[serde(default)]
    pub catalog_name: Option<String>,

    #[serde(default)]
    pub schema_name: Option<String>,

    #[serde(default)]
    pub use_unity_catalog: Option<bool>,

    #[serde(default)]
    pub use_volumes: Option<bool>,

    #[serde(default)]
    pub top_book_count: Option<u32>,

    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<f64>")]
    pub top_book_sampling_fraction: Option<Option<f64>>,
}

/// Distinguish a present `null` (`Some(None)`) from an absent key (`None`).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Some)
}
