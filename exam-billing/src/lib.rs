//! Exam report billing for imaging clinics
//!
//! Turns uploaded exam rows into priced records and clinic/specialist totals:
//! - Classification of raw exam types into billing categories, with
//!   operator-defined overrides taking precedence over the built-in lists
//! - Price resolution per clinic, with specialist-specific overrides
//! - Aggregation into a clinic→specialist totals tree and an invoice view
//! - Display filters and the options they offer
//! - A resolution workflow that holds uploads containing unknown exam types
//!   until each type is mapped to a category
//! - CSV export of computed records
//!
//! [`BillingService`] owns a session and recomputes everything on each change;
//! [`recompute_all`] is the same pipeline as a pure function.

pub mod aggregation;
pub mod classifier;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod pricing;
pub mod processor;
pub mod resolution;
pub mod service;
pub mod store;
pub mod text;

pub use aggregation::*;
pub use classifier::*;
pub use error::*;
pub use export::*;
pub use filter::*;
pub use models::*;
pub use pricing::*;
pub use processor::*;
pub use resolution::*;
pub use service::*;
pub use store::*;
