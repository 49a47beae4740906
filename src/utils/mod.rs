//! Utility module with helper functions
//!
//! This module provides:
//! - Configuration handling
//! - ASCII previews of generated images

mod config;
mod preview;

pub use config::{ensure_config_exists, ComputeTarget, Config, DataConfig, DataSource};
pub use preview::{render_ascii, render_grid};
