//! The synchronization and reconciliation engine.
//!
//! Each component owns one step of the cycle and exposes a `run_job`
//! method used as a scheduler job body.

pub mod collection;
pub mod exporter;
pub mod reconcile;
pub mod upload;
pub mod user_import;

pub use collection::CollectionCoordinator;
pub use exporter::{BatchExporter, ExportBatch};
pub use reconcile::ErrorReconciler;
pub use upload::{PollSettings, UploadOrchestrator, UploadOutcome};
pub use user_import::UserImportCoordinator;
