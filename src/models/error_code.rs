//! Validation codes returned by the payroll importer.

/// Human description of a remote validation code.
pub fn describe(code: &str) -> &'static str {
    match code.trim() {
        "E0" => "Required field",
        "E2" => "Date parse error",
        "E4" => "Overlapping periods",
        "E6" => "Unknown error",
        "E311" => "Month pointing already exists",
        "E312" => "Hours and days must be empty",
        "E313" => "Hours must be empty",
        "E314" => "Maximum number of days exceeded",
        "E315" => "Maximum number of hours exceeded",
        "E316" => "Pointing day is after the exit day",
        "E317" => "Day pointing already exists",
        "E318" => "Invalid pointing day",
        "E319" => "Days belong to different months",
        "E320" => "Duplicated days",
        "E321" => "Maximum hours per day exceeded",
        "E322" => "Invalid pointing interval",
        "E323" => "Overlapping pointings",
        "E325" => "Days must be empty",
        "E326" => "Hours must not be empty",
        "E327" => "Days must not be empty",
        "E344" => "Pointing day is before the start day",
        "E346" => "Month pointing already used in employee pay",
        "E360" => "No matching entrance for this exit",
        "E368" => "Month pointing was updated",
        "N/A" | "" => "Not available",
        _ => "Unknown error code",
    }
}

