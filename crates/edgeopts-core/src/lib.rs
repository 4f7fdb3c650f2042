// # edgeopts-core
//
// Core library for validating and applying edge service options.
//
// ## Architecture Overview
//
// The set of options a service accepts is not known at compile time. Each
// service publishes a metadata document describing its options, and every
// update is checked against that document before anything is written:
//
// - **schema**: Descriptor types for the metadata document and its indexes
// - **resolver**: Fetches the metadata document and builds the indexes
// - **validate**: Per-type value validators and the options-map validator
// - **OptionsUpdater**: Orchestrates split → resolve → validate → apply → side effect
// - **OptionsApi**: Transport trait implemented by the HTTP client and test doubles
//
// ## Design Principles
//
// 1. **No hidden state**: The schema is fetched per call, never cached
// 2. **Exhaustive validation**: Every failing option is reported, not just the first
// 3. **Validation before I/O**: A map that fails validation is never sent
// 4. **Explicit non-atomicity**: The protect-key side effect runs after the
//    options write and is not rolled back with it

pub mod config;
pub mod engine;
pub mod error;
pub mod options;
pub mod resolver;
pub mod schema;
pub mod traits;
pub mod validate;

// Re-export core types for convenience
pub use config::{ApiConfig, UpdaterConfig};
pub use engine::OptionsUpdater;
pub use error::{Error, Result};
pub use options::{OptionsMap, SplitOptions, PROTECT_SERVE_KEY};
pub use resolver::MetadataResolver;
pub use schema::{OptionDescriptor, OptionKind, PropertyDescriptor, PropertyType, SchemaDocument};
pub use traits::{OptionsApi, ProtectKeyAction};
pub use validate::{ErrorCode, ValidationError, ValidationErrorSet};
