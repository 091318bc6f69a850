//! Settings management for the exam billing engine
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! - **Defaults**: compiled-in values of [`BillingSettings`]
//! - **Settings file**: `laudos.yaml`, `laudos.toml` or `laudos.json` in the
//!   working directory, or an explicit file
//! - **Environment**: `LAUDOS__<KEY>` variables, `__` separating nested keys
//!   (`LAUDOS__LOGGING__JSON=true`)
//!
//! # Example
//!
//! ```rust,no_run
//! use config_engine::{PendingUploadPolicy, SettingsLoader};
//!
//! let settings = SettingsLoader::new().with_file("laudos.yaml").load()?;
//! if settings.pending_upload_policy == PendingUploadPolicy::Replace {
//!     println!("new uploads replace pending ones");
//! }
//! # Ok::<(), config_engine::ConfigError>(())
//! ```

pub mod error;
pub mod settings;

pub use error::*;
pub use settings::*;
