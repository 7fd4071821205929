//! Compile-time build metadata exposed to the `--version` surface.

/// Semver package version from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// VCS commit hash captured at build time.
pub const GIT_COMMIT: &str = env!("AIC_BUILD_GIT_HASH");

/// Build timestamp captured at compile time.
pub const BUILD_TIMESTAMP: &str = env!("AIC_BUILD_TIMESTAMP");

/// Body of `aic --version` after the binary name.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\ncommit: ",
    env!("AIC_BUILD_GIT_HASH"),
    "\nbuilt: ",
    env!("AIC_BUILD_TIMESTAMP")
);

/// Help trailer block that surfaces build metadata in `aic --help`.
pub const HELP_BUILD_METADATA: &str = concat!(
    "Build metadata:\n  commit: ",
    env!("AIC_BUILD_GIT_HASH"),
    "\n  built: ",
    env!("AIC_BUILD_TIMESTAMP")
);

/// One-line summary used in debug logs.
pub fn summary_line() -> String {
    format!("aic v{VERSION} ({GIT_COMMIT}, built {BUILD_TIMESTAMP})")
}
