use crate::collab::{PayrollApi, PunchClock};
use crate::errors::AppResult;
use crate::scheduler::JobReport;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Pushes newly onboarded remote employees to the device.
pub struct UserImportCoordinator {
    api: Arc<dyn PayrollApi>,
    device: Arc<dyn PunchClock>,
}

impl UserImportCoordinator {
    pub fn new(api: Arc<dyn PayrollApi>, device: Arc<dyn PunchClock>) -> Self {
        Self { api, device }
    }

    /// Register every remote employee whose code the device does not know.
    /// Returns the number of users pushed.
    pub fn try_import(&self) -> AppResult<usize> {
        let employees = self.api.get_employees()?;
        if employees.is_empty() {
            warn!("No employees found from API");
            return Ok(0);
        }

        let mut saved_codes: HashSet<String> =
            self.device.get_users()?.into_iter().map(|u| u.name).collect();

        let mut imported = 0;
        for employee in &employees {
            let code = employee.code.as_deref().map(str::trim).filter(|c| !c.is_empty());
            let (Some(id), Some(code)) = (employee.id, code) else {
                warn!("Skipping employee due to missing data: {employee:?}");
                continue;
            };

            if saved_codes.contains(code) {
                debug!("Skipping employee {code}, already on device");
                continue;
            }

            match self.device.set_user(id, code) {
                Ok(true) => {
                    info!("Added user {code} with id {id} to device");
                    saved_codes.insert(code.to_string());
                    imported += 1;
                }
                Ok(false) => warn!("Device refused user {code} (id {id})"),
                Err(e) => warn!("Failed to push user {code} (id {id}): {e}"),
            }
        }

        info!("Imported {imported} users from API to device");
        Ok(imported)
    }

    /// Like [`try_import`](Self::try_import), but an unreachable device or
    /// API counts as zero imported.
    pub fn import_users_from_api_to_device(&self) -> AppResult<usize> {
        match self.try_import() {
            Ok(n) => Ok(n),
            Err(e) if e.is_retryable() => {
                warn!("User import skipped ({}): {e}", e.kind());
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    pub fn run_job(&self) -> AppResult<JobReport> {
        let n = self.import_users_from_api_to_device()?;
        Ok(JobReport::ok(n, format!("{n} users pushed to device")))
    }
}
