use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "HospitalBooking";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name of the booking database inside the data directory
pub const DATABASE_FILE: &str = "bookings.db";

/// Format of appointment timestamps as written by front-desk staff,
/// e.g. `19:30 24/04/2023`.
pub const TIMESTAMP_FORMAT: &str = "%H:%M %d/%m/%Y";

/// Get the application data directory.
/// Falls back to the system temp dir when the platform has no data dir.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_NAME)
}

/// Default location of the booking database
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Log filter used when `RUST_LOG` is not set
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "hospital_booking=debug,warn"
    } else {
        "hospital_booking=info,warn"
    }
}
