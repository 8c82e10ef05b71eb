use derive_more::{Display, Error, From, IsVariant};

use crate::fs::error::{DiskError, InvalidOpError, PathLengthError};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path text is empty")]
pub struct EmptyStrError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path text contains a null byte")]
pub struct InteriorNulError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("a component of the path is too long")]
pub struct ComponentLengthError;

/// The reasons that text can be rejected as a path.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum PathParseError {
    Empty(EmptyStrError),
    InteriorNul(InteriorNulError),
    PathLength(PathLengthError),
    ComponentLength(ComponentLengthError),
}

impl From<PathParseError> for DiskError {
    fn from(value: PathParseError) -> Self {
        match value {
            PathParseError::PathLength(e) => e.into(),
            PathParseError::ComponentLength(_) => PathLengthError.into(),
            PathParseError::Empty(_) | PathParseError::InteriorNul(_) => InvalidOpError.into(),
        }
    }
}
