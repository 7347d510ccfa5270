// Build metadata from Cargo.toml, logged at startup

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `name vX.Y.Z` for the startup log line.
pub fn banner() -> String {
    format!("{NAME} v{VERSION}")
}
