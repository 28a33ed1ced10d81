//! Settings for the tapline player.
//!
//! Two kinds of configuration live here:
//!
//! - **Persisted settings**: [`PlayerSettings`], a TOML file under the
//!   platform config directory (see [`paths`]). Read at startup, written
//!   back when the user changes something.
//! - **Live parameters**: [`SharedSettings`], the reverb amount and output
//!   volume as relaxed atomics. A control thread writes them, the audio
//!   thread reads them once per block.
//!
//! # Example
//!
//! ```rust,no_run
//! use tapline_config::{PlayerSettings, SharedSettings, paths};
//!
//! let mut settings = PlayerSettings::load_or_default(paths::settings_path()).unwrap();
//! let live = SharedSettings::from_settings(&settings);
//!
//! live.set_reverb(8);
//! live.store_into(&mut settings);
//! settings.save(paths::settings_path()).unwrap();
//! ```

mod error;
mod settings;
mod shared;

/// Platform-specific configuration paths.
pub mod paths;

pub use error::ConfigError;
pub use paths::{settings_path, user_config_dir};
pub use settings::{DiskSaverSettings, OutputSettings, PlayerSettings, ReverbSettings};
pub use shared::SharedSettings;
