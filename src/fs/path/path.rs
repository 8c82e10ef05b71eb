use std::ffi::{CString, OsStr, OsString};
use std::fmt::{self, Display, Formatter};
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::str::FromStr;

use crate::fs::error::{DiskError, EmptyPathError};
use crate::fs::path::validity::{self, SEPARATOR};
use crate::fs::path::PathParseError;

/// A path on the host file system, independent of whether anything exists there.
///
/// A `Path` is either empty, which is the only invalid state it can be in, or holds text that is
/// syntactically valid for the host OS. Every operation that changes a `Path` either produces new
/// valid text or fails and leaves the `Path` untouched.
///
/// # Invariants
/// - The text is non-empty.
/// - The text contains no `\0`.
/// - The text is shorter than `PATH_MAX`, and no component is longer than `NAME_MAX`.
///
/// Paths compare and order by their text, with the empty path first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    pub(crate) inner: Option<OsString>,
}

impl Path {
    /// Creates an empty (invalid) path.
    pub const fn new() -> Path {
        Path { inner: None }
    }

    /// Validates `text` and creates a path holding it, exactly as given.
    pub fn from_os_str<S: AsRef<OsStr>>(text: S) -> Result<Path, PathParseError> {
        let text = text.as_ref();
        validity::validate(text.as_bytes())?;
        Ok(Path {
            inner: Some(text.to_owned()),
        })
    }

    /// Wraps text that is already known to be valid.
    pub(crate) fn from_valid(text: Vec<u8>) -> Path {
        debug_assert!(validity::validate(&text).is_ok());
        Path {
            inner: Some(OsString::from_vec(text)),
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    pub const fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn as_os_str(&self) -> &OsStr {
        self.inner.as_deref().unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.as_os_str().as_bytes()
    }

    /// The final component of the path. Trailing separators are ignored, so `/usr/lib/` yields
    /// `lib`, and the root yields `/`. Without any separator, this is the whole path.
    pub fn last_component(&self) -> &OsStr {
        let trimmed = validity::trim_trailing_separators(self.as_bytes());
        if trimmed == [SEPARATOR] {
            return OsStr::from_bytes(trimmed);
        }
        OsStr::from_bytes(&trimmed[validity::last_component_start(trimmed)..])
    }

    /// The final component without its suffix, e.g. `foo` for `/tmp/foo.tar`.
    pub fn base_name(&self) -> &OsStr {
        let component = self.last_component().as_bytes();
        match validity::suffix_start(component) {
            Some(dot) => OsStr::from_bytes(&component[..dot]),
            None => OsStr::from_bytes(component),
        }
    }

    /// Whether the text ends with a separator, so it can only ever name a directory.
    pub fn is_directory_style(&self) -> bool {
        self.as_bytes().last() == Some(&SEPARATOR)
    }

    pub(crate) fn to_c_string(&self) -> Result<CString, DiskError> {
        match &self.inner {
            // The invariant rules out interior null bytes.
            Some(text) => CString::new(text.as_bytes()).map_err(|_| EmptyPathError.into()),
            None => Err(EmptyPathError)?,
        }
    }

    /// Resets the path to the empty state.
    pub fn clear(&mut self) {
        self.inner = None;
    }

    /// Replaces the path with `text` if it is valid. Returns whether the path changed.
    pub fn set<S: AsRef<OsStr>>(&mut self, text: S) -> bool {
        match Path::from_os_str(text) {
            Ok(path) => {
                *self = path;
                true
            },
            Err(_) => false,
        }
    }

    /// Removes the final component, along with the separator before it. A path with a single
    /// relative component becomes empty, while one directly below the root becomes the root.
    /// Erasing from an empty path succeeds and leaves it empty.
    pub fn erase_last_component(&mut self) -> bool {
        let Some(text) = &self.inner else {
            return true;
        };
        let trimmed = validity::trim_trailing_separators(text.as_bytes());

        let remaining = match trimmed.iter().rposition(|ch| *ch == SEPARATOR) {
            _ if trimmed == [SEPARATOR] => None,
            None => None,
            Some(0) => Some(&trimmed[..1]),
            Some(i) => Some(validity::trim_trailing_separators(&trimmed[..i])),
        };

        self.inner = remaining.map(|rem| OsStr::from_bytes(rem).to_owned());
        true
    }

    /// Appends `name` as a new final component, adding a separator unless the path already ends
    /// with one. Fails if `name` isn't a valid single component or the result would be too long.
    pub fn append_component<S: AsRef<OsStr>>(&mut self, name: S) -> bool {
        let name = name.as_ref().as_bytes();
        if !validity::is_valid_component(name) {
            return false;
        }

        let mut joined = Vec::with_capacity(self.as_bytes().len() + name.len() + 1);
        joined.extend_from_slice(self.as_bytes());
        if !joined.is_empty() && joined.last() != Some(&SEPARATOR) {
            joined.push(SEPARATOR);
        }
        joined.extend_from_slice(name);

        self.replace_if_valid(joined)
    }

    /// Appends `.suffix` to a path that names a file. Fails for empty and directory-style paths,
    /// for paths ending in `.` or `..` and for suffixes that aren't valid in a component.
    pub fn append_suffix<S: AsRef<OsStr>>(&mut self, suffix: S) -> bool {
        let suffix = suffix.as_ref().as_bytes();
        if self.is_empty() || self.is_directory_style() || !validity::is_valid_component(suffix) {
            return false;
        }
        let last = self.last_component().as_bytes();
        if last == b"." || last == b".." {
            return false;
        }

        let mut joined = Vec::with_capacity(self.as_bytes().len() + suffix.len() + 1);
        joined.extend_from_slice(self.as_bytes());
        joined.push(b'.');
        joined.extend_from_slice(suffix);

        self.replace_if_valid(joined)
    }

    /// Removes the suffix of the final component, from its last `.` onwards. Fails if there isn't
    /// one.
    pub fn erase_suffix(&mut self) -> bool {
        let text = self.as_bytes();
        let start = validity::last_component_start(text);
        match validity::suffix_start(&text[start..]) {
            Some(dot) => {
                let erased = text[..start + dot].to_vec();
                self.inner = Some(OsString::from_vec(erased));
                true
            },
            None => false,
        }
    }

    fn replace_if_valid(&mut self, text: Vec<u8>) -> bool {
        if validity::validate(&text).is_err() {
            return false;
        }
        self.inner = Some(OsString::from_vec(text));
        true
    }
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::from_os_str(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Path::from_os_str(value)
    }
}

impl TryFrom<&OsStr> for Path {
    type Error = PathParseError;

    fn try_from(value: &OsStr) -> Result<Self, Self::Error> {
        Path::from_os_str(value)
    }
}

impl TryFrom<OsString> for Path {
    type Error = PathParseError;

    fn try_from(value: OsString) -> Result<Self, Self::Error> {
        validity::validate(value.as_bytes())?;
        Ok(Path { inner: Some(value) })
    }
}

impl AsRef<OsStr> for Path {
    fn as_ref(&self) -> &OsStr {
        self.as_os_str()
    }
}

impl AsRef<std::path::Path> for Path {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(self.as_os_str())
    }
}

/// Writes the text of the path, replacing any bytes that aren't UTF-8. The empty path writes
/// nothing.
impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_os_str().to_string_lossy())
    }
}
