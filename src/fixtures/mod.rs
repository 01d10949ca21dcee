//! Fixtures

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    catalog::CatalogError,
    configurator::{ConfiguratorError, ProductConfigurator},
    fixtures::catalog::CatalogsFixture,
    pricing::ProductOverride,
};

pub mod catalog;
pub mod prices;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid modifier format
    #[error("Invalid modifier format: {0}")]
    InvalidModifier(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product defined twice across loaded files
    #[error("Product defined more than once: {0}")]
    DuplicateProduct(String),

    /// Catalog definition error
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Configurator construction error
    #[error("Invalid product configuration: {0}")]
    Configurator(#[from] ConfiguratorError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// String key -> configured product
    configurators: FxHashMap<String, ProductConfigurator<'static>>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            configurators: FxHashMap::default(),
        }
    }

    /// Load product catalogs from a YAML fixture file
    ///
    /// Overrides in the file apply to the products declared in the same file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product is already
    /// loaded, or if a catalog is invalid.
    pub fn load_catalogs(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("catalogs").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CatalogsFixture = serde_norway::from_str(&contents)?;

        let overrides = fixture
            .overrides
            .into_iter()
            .map(ProductOverride::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        for (key, product_fixture) in fixture.products {
            if self.configurators.contains_key(&key) {
                return Err(FixtureError::DuplicateProduct(key));
            }

            let configurator = product_fixture.try_into_configurator(&key, &overrides)?;

            self.configurators.insert(key, configurator);
        }

        Ok(self)
    }

    /// Load a fixture set from the default base path
    ///
    /// # Errors
    ///
    /// Returns an error if the catalogs cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_catalogs(name)?;

        Ok(fixture)
    }

    /// Get a configured product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn configurator(&self, key: &str) -> Result<&ProductConfigurator<'static>, FixtureError> {
        self.configurators
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Keys of every loaded product, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.configurators.keys().map(String::as_str).collect();

        keys.sort_unstable();

        keys
    }

    /// Number of loaded products
    pub fn len(&self) -> usize {
        self.configurators.len()
    }

    /// Whether no product has been loaded
    pub fn is_empty(&self) -> bool {
        self.configurators.is_empty()
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
