//! Core traits for kgpath configuration.
//!
//! [`ConfigProvider`] is the seam between however an application stores its
//! settings (TOML file, environment, test fixture) and the code that opens
//! store connections and runs extractions.

use crate::{ExtractionSettings, Result, StoreSettings};

/// Trait for application configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use kgpath_core::{ConfigProvider, ExtractionSettings, Result, StoreSettings};
///
/// #[derive(Clone)]
/// struct FixedConfig {
///     store: StoreSettings,
/// }
///
/// impl ConfigProvider for FixedConfig {
///     fn project_name(&self) -> &str {
///         "steel-qa"
///     }
///
///     fn store_settings(&self) -> Result<StoreSettings> {
///         self.store.validate()?;
///         Ok(self.store.clone())
///     }
///
///     fn extraction_settings(&self) -> ExtractionSettings {
///         ExtractionSettings::default()
///     }
/// }
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used in log lines and default paths.
    fn project_name(&self) -> &str;

    /// Connection settings for the graph store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) when credentials or
    /// the endpoint are missing. Callers treat this as fatal at startup.
    fn store_settings(&self) -> Result<StoreSettings>;

    /// Defaults for extraction requests.
    fn extraction_settings(&self) -> ExtractionSettings;
}
