//! GDPR data-processing log entities.

pub mod activity;
pub mod legal_basis;
pub mod model;

pub use activity::ActivityType;
pub use legal_basis::LegalBasis;
pub use model::{CreateDataProcessingLog, DataProcessingLog};
