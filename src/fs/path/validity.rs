use crate::fs::error::PathLengthError;
use crate::fs::path::{ComponentLengthError, EmptyStrError, InteriorNulError, PathParseError};

/// The maximum length of a path in bytes, including its null terminator.
pub const PATH_MAX: usize = libc::PATH_MAX as usize;
/// The maximum length of a single path component in bytes.
pub const NAME_MAX: usize = 255;

pub const SEPARATOR: u8 = b'/';

/// Checks that `value` is a syntactically valid path on this OS. Existence isn't considered.
pub fn validate(value: &[u8]) -> Result<(), PathParseError> {
    if value.is_empty() {
        Err(EmptyStrError)?
    }
    if value.contains(&b'\0') {
        Err(InteriorNulError)?
    }
    // Leave room for the terminator that every syscall needs.
    if value.len() >= PATH_MAX {
        Err(PathLengthError)?
    }
    if value.split(|ch| *ch == SEPARATOR).any(|component| component.len() > NAME_MAX) {
        Err(ComponentLengthError)?
    }
    Ok(())
}

/// Whether `value` can be used as a single component: non-empty, without separators or null bytes
/// and short enough for the file system.
pub fn is_valid_component(value: &[u8]) -> bool {
    !value.is_empty()
        && value.len() <= NAME_MAX
        && !value.contains(&SEPARATOR)
        && !value.contains(&b'\0')
}

/// Strips trailing separators, keeping a lone root separator.
pub(crate) fn trim_trailing_separators(value: &[u8]) -> &[u8] {
    let mut end = value.len();
    while end > 1 && value[end - 1] == SEPARATOR {
        end -= 1;
    }
    &value[..end]
}

/// The index at which the final component of `value` starts.
pub(crate) fn last_component_start(value: &[u8]) -> usize {
    value.iter().rposition(|ch| *ch == SEPARATOR).map_or(0, |i| i + 1)
}

/// The index of the `.` that starts the suffix of `component`, if it has one. A leading `.` marks
/// a hidden entry rather than a suffix, and components made only of dots (`..`, `...`) have none.
pub(crate) fn suffix_start(component: &[u8]) -> Option<usize> {
    if component.iter().all(|ch| *ch == b'.') {
        return None;
    }
    match component.iter().rposition(|ch| *ch == b'.') {
        Some(0) | None => None,
        Some(i) => Some(i),
    }
}
