use chrono::{SecondsFormat, Utc};

pub const APP_NAME: &str = "formhelper_backend";

/// Fixed-width RFC 3339 timestamp so stored values sort lexicographically.
pub fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn print_banner() {
    println!("{APP_NAME} v{}", env!("CARGO_PKG_VERSION"));
}
