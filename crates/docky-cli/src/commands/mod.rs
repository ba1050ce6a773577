pub mod apply;
pub mod check;
pub mod completions;

use console::Style;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CONFIG_ERROR: u8 = 2;

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn drift_line(line: &str) -> String {
    Style::new().yellow().apply_to(line).to_string()
}

pub fn failure_line(line: &str) -> String {
    Style::new().red().apply_to(line).to_string()
}
