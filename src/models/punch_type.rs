use crate::errors::AppError;
use log::warn;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether a device event is a clock-in or a clock-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PunchType {
    In,
    Out,
}

impl PunchType {
    /// Normalize a raw device punch code.
    ///
    /// 0 check-in, 3 break-in, 4 overtime-in → In
    /// 1 check-out, 2 break-out, 5 overtime-out → Out
    pub fn from_device_code(code: i64) -> Self {
        match code {
            0 | 3 | 4 => PunchType::In,
            1 | 2 | 5 => PunchType::Out,
            other => {
                warn!("Unknown device punch code {other}, treating it as IN");
                PunchType::In
            }
        }
    }

    /// Convert enum → DB integer
    pub fn to_db_code(&self) -> i64 {
        match self {
            PunchType::In => 0,
            PunchType::Out => 1,
        }
    }

    /// Convert DB integer → enum
    pub fn from_db_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PunchType::In),
            1 => Some(PunchType::Out),
            _ => None,
        }
    }

    /// Label expected by the payroll importer.
    pub fn label(&self) -> &'static str {
        match self {
            PunchType::In => "entree",
            PunchType::Out => "sortie",
        }
    }

    pub fn is_in(&self) -> bool {
        matches!(self, PunchType::In)
    }

    pub fn is_out(&self) -> bool {
        matches!(self, PunchType::Out)
    }
}

impl FromStr for PunchType {
    type Err = AppError;

    /// Accepts `in`/`out` or the importer labels, case-insensitive.
    fn from_str(s: &str) -> Result<Self, AppError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "entree" => Ok(PunchType::In),
            "out" | "sortie" => Ok(PunchType::Out),
            other => Err(AppError::InvalidInput(format!(
                "invalid punch type '{other}' (expected in or out)"
            ))),
        }
    }
}
