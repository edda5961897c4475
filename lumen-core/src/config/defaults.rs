//! Compiled-in configuration defaults.

pub fn log_level() -> String {
    "info".to_string()
}

pub fn log_format() -> String {
    "text".to_string()
}
