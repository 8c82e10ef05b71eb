use std::env;
use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;

use crate::config;
use crate::fs::error::{DiskError, PathLengthError};
use crate::fs::path::Path;
use crate::fs::syscall::err_no;

impl Path {
    pub fn root() -> Path {
        Path::from_valid(b"/".to_vec())
    }

    /// Creates a new, uniquely named directory inside the OS temporary directory and returns its
    /// path.
    pub fn temporary_directory() -> Result<Path, DiskError> {
        let mut template = config::temp_dir()
            .and_then(|dir| Path::from_os_str(dir).ok())
            .filter(|dir| matches!(dir.is_directory(), Ok(true)))
            .unwrap_or_else(|| Path::from_valid(config::DEFAULT_TEMP_DIR.as_bytes().to_vec()));

        if !template.append_component(format!("{}XXXXXX", config::TEMP_DIR_PREFIX)) {
            Err(PathLengthError)?
        }

        let mut buf = template.to_c_string()?.into_bytes_with_nul();
        // SAFETY: buf is a writable, null-terminated template ending in "XXXXXX", which mkdtemp
        // overwrites in place without changing its length.
        if unsafe { libc::mkdtemp(buf.as_mut_ptr().cast()) }.is_null() {
            Err(DiskError::from_errno(err_no()))?
        }
        buf.pop();

        let dir = Path::from_valid(buf);
        tracing::debug!(path = %dir, "created temporary directory");
        Ok(dir)
    }

    /// The current user's home directory, or the root if there isn't one.
    #[allow(deprecated)]
    pub fn user_home() -> Path {
        env::home_dir()
            .and_then(|dir| Path::from_os_str(dir.as_os_str()).ok())
            .unwrap_or_else(Path::root)
    }

    /// The system-wide configuration directory.
    pub fn config_dir() -> Path {
        Path::from_valid(config::DEFAULT_CONFIG_DIR.as_bytes().to_vec())
    }

    /// The configuration directory of this installation. This is the system-wide one unless the
    /// build was configured with another.
    pub fn installed_config_dir() -> Path {
        config::INSTALLED_CONFIG_DIR
            .and_then(|dir| Path::from_os_str(dir).ok())
            .unwrap_or_else(Path::config_dir)
    }

    /// Appends the directories to search for shared libraries to `paths`: first those listed in
    /// the search path environment variable that exist as directories, then the compiled-in
    /// system directories, whether they exist or not.
    pub fn system_library_paths(paths: &mut Vec<Path>) {
        push_search_path_dirs(paths);
        push_default_dirs(paths, config::SYSTEM_LIBRARY_DIRS);
    }

    /// Like [`system_library_paths`](Path::system_library_paths), with the auxiliary library
    /// directory searched before the system directories.
    pub fn aux_library_paths(paths: &mut Vec<Path>) {
        push_search_path_dirs(paths);
        push_if_dir(paths, OsStr::new(config::AUX_LIBRARY_DIR));
        Path::system_library_paths(paths);
    }

    /// Searches the system library paths for `lib<short_name>.so`, then `lib<short_name>.a`.
    /// Returns the first readable match, or an empty path.
    pub fn find_library(short_name: &str) -> Path {
        let mut dirs = Vec::new();
        Path::system_library_paths(&mut dirs);

        let file_name = format!("{}{}", config::LIBRARY_PREFIX, short_name);
        for mut candidate in dirs {
            if !candidate.append_component(&file_name) {
                continue;
            }
            for suffix in [Path::dynamic_library_suffix(), config::STATIC_LIBRARY_SUFFIX] {
                let mut library = candidate.clone();
                if library.append_suffix(suffix)
                    && library.can_read()
                    && matches!(library.is_file(), Ok(true))
                {
                    tracing::trace!(library = %library, "found library");
                    return library;
                }
            }
        }
        Path::new()
    }

    pub const fn dynamic_library_suffix() -> &'static str {
        config::DYNAMIC_LIBRARY_SUFFIX
    }
}

fn push_search_path_dirs(paths: &mut Vec<Path>) {
    if let Some(value) = config::lib_search_path() {
        for entry in value.as_bytes().split(|ch| *ch == b':') {
            push_if_dir(paths, OsStr::from_bytes(entry));
        }
    }
}

/// Appends the compiled-in `dirs` that aren't listed yet. They aren't checked against the disk.
pub(crate) fn push_default_dirs(paths: &mut Vec<Path>, dirs: &[&str]) {
    for dir in dirs {
        let Ok(dir) = Path::from_os_str(dir) else {
            continue;
        };
        if !paths.contains(&dir) {
            paths.push(dir);
        }
    }
}

fn push_if_dir(paths: &mut Vec<Path>, text: &OsStr) {
    let Ok(dir) = Path::from_os_str(text) else {
        return;
    };
    if matches!(dir.is_directory(), Ok(true)) && !paths.contains(&dir) {
        paths.push(dir);
    }
}
