use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

fn default_device_port() -> u16 {
    4370
}
fn default_collection_interval() -> u32 {
    60
}
fn default_upload_interval() -> u32 {
    1
}
fn default_import_interval() -> u32 {
    12
}

/// The single system-wide configuration row (`config` table).
///
/// Read once at startup and shared immutably afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(skip)]
    pub id: Option<i64>,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub api_username: String,
    #[serde(default)]
    pub api_password: String,
    #[serde(default)]
    pub api_secret_key: String,
    #[serde(default)]
    pub device_ip: String,
    #[serde(default = "default_device_port")]
    pub device_port: u16,
    /// Minutes between device collections.
    #[serde(default = "default_collection_interval")]
    pub collection_interval: u32,
    /// Minutes between upload attempts.
    #[serde(default = "default_upload_interval")]
    pub upload_interval: u32,
    /// Minutes between employee imports.
    #[serde(default = "default_import_interval")]
    pub import_interval: u32,
    #[serde(skip)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(skip)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            id: None,
            company_id: String::new(),
            api_username: String::new(),
            api_password: String::new(),
            api_secret_key: String::new(),
            device_ip: String::new(),
            device_port: default_device_port(),
            collection_interval: default_collection_interval(),
            upload_interval: default_upload_interval(),
            import_interval: default_import_interval(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl SyncConfig {
    /// Copy with secrets blanked, for display.
    pub fn masked(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { "********".to_string() };
        Self {
            api_password: mask(&self.api_password),
            api_secret_key: mask(&self.api_secret_key),
            ..self.clone()
        }
    }

    /// Apply a `key=value` assignment coming from the CLI.
    pub fn set_field(&mut self, key: &str, value: &str) -> crate::errors::AppResult<()> {
        use crate::errors::AppError;

        let parse_u32 = |v: &str| match v.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::Config(format!(
                "'{key}' expects a positive integer, got '{v}'"
            ))),
        };

        match key.trim().replace('-', "_").as_str() {
            "company_id" => self.company_id = value.to_string(),
            "api_username" => self.api_username = value.to_string(),
            "api_password" => self.api_password = value.to_string(),
            "api_secret_key" => self.api_secret_key = value.to_string(),
            "device_ip" => self.device_ip = value.to_string(),
            "device_port" => {
                self.device_port = value
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Config(format!("invalid device port '{value}'")))?
            }
            "collection_interval" => self.collection_interval = parse_u32(value)?,
            "upload_interval" => self.upload_interval = parse_u32(value)?,
            "import_interval" => self.import_interval = parse_u32(value)?,
            other => return Err(AppError::Config(format!("unknown configuration key '{other}'"))),
        }
        Ok(())
    }

    /// Check the row is usable by the agent before it is saved.
    pub fn validate(&self) -> crate::errors::AppResult<()> {
        use crate::errors::AppError;

        let mut missing = Vec::new();
        if self.company_id.trim().is_empty() {
            missing.push("company_id");
        }
        if self.device_ip.trim().is_empty() {
            missing.push("device_ip");
        }
        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "required field(s) not set: {}",
                missing.join(", ")
            )));
        }

        for (name, value) in [
            ("collection_interval", self.collection_interval),
            ("upload_interval", self.upload_interval),
            ("import_interval", self.import_interval),
        ] {
            if value == 0 {
                return Err(AppError::Config(format!("'{name}' must be positive")));
            }
        }
        Ok(())
    }
}
