//! Operator tooling for the exam billing engine
//!
//! Backs the `laudos` binary:
//! - **Row source**: parses uploaded CSV spreadsheets and JSON row arrays
//! - **Catalog**: clinic prices, specialist prices and custom mappings kept in
//!   one JSON or YAML file, which also serves as the mapping store
//! - **Prompts**: interactive resolution of unknown exam types
//! - **Rendering**: totals tree, invoice view and warnings for the terminal
//!
//! # Example Usage
//!
//! ```bash
//! # Process an upload, resolving unknown exam types interactively
//! laudos process --rows laudos.csv --catalog catalogo.json
//!
//! # Only one clinic, with the invoice view and a CSV export
//! laudos process --rows laudos.csv --catalog catalogo.json \
//!     --clinic "Clínica A" --invoice --export .
//!
//! # Inspect mappings and the built-in taxonomy
//! laudos mappings --catalog catalogo.json
//! laudos exam-types
//! ```

pub mod catalog;
pub mod error;
pub mod prompt;
pub mod render;
pub mod row_source;

pub use catalog::*;
pub use error::*;
