//! The settings that steer the well-known locations of [`Path`](crate::fs::path::Path).
//!
//! Runtime settings are read from environment variables on every lookup, nothing is cached.
//! Install locations are baked in at build time from the environment of `cargo build`, falling back
//! to the defaults below.

use std::env;
use std::ffi::OsString;

/// Colon separated directories searched for libraries before the compiled-in defaults.
pub const LIB_SEARCH_PATH_VAR: &str = "SYS_PATH_LIB_SEARCH_PATH";

/// The OS-designated location for temporary files.
pub const TEMP_DIR_VAR: &str = "TMPDIR";

pub const DEFAULT_TEMP_DIR: &str = "/tmp";

/// Prefix given to the directories created by
/// [`Path::temporary_directory`](crate::fs::path::Path::temporary_directory).
pub const TEMP_DIR_PREFIX: &str = "sys-path-";

/// The system-wide configuration directory.
pub const DEFAULT_CONFIG_DIR: &str = "/etc/sys-path/";

/// The configuration directory of this installation, set with `SYS_PATH_ETCDIR` at build time.
pub const INSTALLED_CONFIG_DIR: Option<&str> = option_env!("SYS_PATH_ETCDIR");

/// The auxiliary library directory, set with `SYS_PATH_LIBDIR` at build time.
pub const AUX_LIBRARY_DIR: &str = match option_env!("SYS_PATH_LIBDIR") {
    Some(dir) => dir,
    None => "/usr/local/lib/sys-path",
};

/// Searched after any directories listed in [`LIB_SEARCH_PATH_VAR`].
pub const SYSTEM_LIBRARY_DIRS: &[&str] = &["/usr/lib", "/lib"];

pub const LIBRARY_PREFIX: &str = "lib";
pub const DYNAMIC_LIBRARY_SUFFIX: &str = "so";
pub const STATIC_LIBRARY_SUFFIX: &str = "a";

/// The raw value of [`LIB_SEARCH_PATH_VAR`], if set and non-empty.
pub fn lib_search_path() -> Option<OsString> {
    env::var_os(LIB_SEARCH_PATH_VAR).filter(|value| !value.is_empty())
}

/// The raw value of [`TEMP_DIR_VAR`], if set and non-empty.
pub fn temp_dir() -> Option<OsString> {
    env::var_os(TEMP_DIR_VAR).filter(|value| !value.is_empty())
}
