//! Export settings
//!
//! Defaults the pipeline falls back on when a document leaves something
//! unspecified, loaded from YAML.

pub mod loader;
pub mod types;

pub use loader::SettingsLoader;
pub use types::Settings;
