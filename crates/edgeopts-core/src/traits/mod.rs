//! Core traits for the options engine
//!
//! - [`OptionsApi`]: Remote operations the engine consumes, addressed by service ID

pub mod options_api;

pub use options_api::{OptionsApi, ProtectKeyAction};
