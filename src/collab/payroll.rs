use crate::errors::AppResult;
use crate::models::{Employee, ImportLine, PointingImport, UploadResponse};
use std::path::Path;

/// The remote payroll API.
///
/// Transport and auth failures come back as `AppError::Network`; a
/// well-formed rejection of an upload is an `UploadResponse` with
/// `success == false`.
pub trait PayrollApi: Send + Sync {
    fn authenticate(&self) -> AppResult<bool>;

    /// Submit a batch artifact; acceptance is only known later via
    /// [`PayrollApi::get_pointing_import`].
    fn upload_attendance(&self, artifact_path: &Path) -> AppResult<UploadResponse>;

    fn get_employees(&self) -> AppResult<Vec<Employee>>;

    /// Status of the most recent import.
    fn get_pointing_import(&self) -> AppResult<PointingImport>;

    /// Failed lines of the most recent import.
    fn get_pointing_import_lines(&self) -> AppResult<Vec<ImportLine>>;

    /// Timestamps the remote accepted for a job, in ISO form.
    fn get_pointings_with_job_id(&self, job_id: &str) -> AppResult<Vec<String>>;
}
