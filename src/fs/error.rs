use derive_more::{Display, Error, From, IsVariant};
use libc::c_int;

use crate::fs::panic::{BadFdPanic, BadStackAddrPanic, Panic};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("interrupted by signal")]
pub struct InterruptError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("error during I/O")]
pub struct IOError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("available storage space exhausted")]
pub struct StorageExhaustedError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("file metadata would overflow capacity")]
pub struct MetadataOverflowError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("out of memory")]
pub struct OOMError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("exceeded open file limit for process")]
pub struct FileCountError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("search permission is denied for one of the directories in the provided path")]
pub struct NoSearchError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path contains too many symlinks")]
pub struct ExcessiveLinksError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path is too long")]
pub struct PathLengthError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("a component of the provided path does not exist")]
pub struct MissingComponentError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("a component of the provided path is not a directory")]
pub struct NonDirComponentError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("permission denied")]
pub struct PermissionError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("file system is read-only")]
pub struct ReadOnlyFSError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("an entry already exists at the provided path")]
pub struct AlreadyExistsError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("directory is not empty")]
pub struct NotEmptyError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("entry is in use by the system or another process")]
pub struct BusyError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("source and destination are on different file systems")]
pub struct CrossDeviceError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("entry is a directory")]
pub struct IsDirError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("operation is invalid for this entry")]
pub struct InvalidOpError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("path is empty")]
pub struct EmptyPathError;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Error)]
#[display("unexpected OS error with code: {_0}")]
pub struct UnexpectedError(#[error(not(source))] pub c_int);

/// Failures while resolving a path to an entry, shared by every syscall that takes a pathname.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum PathError {
    NoSearch(NoSearchError),
    ExcessiveLinks(ExcessiveLinksError),
    PathLength(PathLengthError),
    MissingComponent(MissingComponentError),
    NonDirComponent(NonDirComponentError),
}

/// Any hard failure raised by an operation that touches the disk.
///
/// Conditions that callers routinely branch on (an entry that doesn't exist, a path that names the
/// wrong kind of entry) are never reported through this type. They show up as `false` or `None`
/// in the return value of the operation instead.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, From, Error, IsVariant)]
pub enum DiskError {
    Path(PathError),
    EmptyPath(EmptyPathError),
    Permission(PermissionError),
    ReadOnlyFS(ReadOnlyFSError),
    AlreadyExists(AlreadyExistsError),
    NotEmpty(NotEmptyError),
    Busy(BusyError),
    CrossDevice(CrossDeviceError),
    IsDir(IsDirError),
    InvalidOp(InvalidOpError),
    Interrupt(InterruptError),
    IO(IOError),
    StorageExhausted(StorageExhaustedError),
    MetadataOverflow(MetadataOverflowError),
    OOM(OOMError),
    FileCount(FileCountError),
    Unexpected(UnexpectedError),
}

macro_rules! path_error_from {
    ($($err:ident),*) => {
        $(
            impl From<$err> for DiskError {
                fn from(value: $err) -> Self {
                    DiskError::Path(PathError::from(value))
                }
            }
        )*
    };
}

path_error_from!(
    NoSearchError, ExcessiveLinksError, PathLengthError, MissingComponentError,
    NonDirComponentError
);

impl DiskError {
    /// Maps an errno value to the matching error. `EBADF` and `EFAULT` mean that a descriptor or
    /// pointer handed to the kernel was corrupt, so they panic instead.
    pub(crate) fn from_errno(errno: c_int) -> DiskError {
        match errno {
            libc::EACCES | libc::EPERM => PermissionError.into(),
            libc::ELOOP => ExcessiveLinksError.into(),
            libc::ENAMETOOLONG => PathLengthError.into(),
            libc::ENOENT => MissingComponentError.into(),
            libc::ENOTDIR => NonDirComponentError.into(),
            libc::EROFS => ReadOnlyFSError.into(),
            libc::EEXIST => AlreadyExistsError.into(),
            libc::ENOTEMPTY => NotEmptyError.into(),
            libc::EBUSY | libc::ETXTBSY => BusyError.into(),
            libc::EXDEV => CrossDeviceError.into(),
            libc::EISDIR => IsDirError.into(),
            libc::EINVAL => InvalidOpError.into(),
            libc::EINTR => InterruptError.into(),
            libc::EIO => IOError.into(),
            libc::ENOSPC | libc::EDQUOT | libc::EFBIG | libc::EMLINK => StorageExhaustedError.into(),
            libc::EOVERFLOW => MetadataOverflowError.into(),
            libc::ENOMEM => OOMError.into(),
            libc::EMFILE | libc::ENFILE => FileCountError.into(),
            libc::EBADF => BadFdPanic.panic(),
            libc::EFAULT => BadStackAddrPanic.panic(),
            e => UnexpectedError(e).into(),
        }
    }

    /// Like [`from_errno`](DiskError::from_errno), for the `stat` family, where `EACCES` can only
    /// mean that a parent directory may not be searched.
    pub(crate) fn from_stat_errno(errno: c_int) -> DiskError {
        match errno {
            libc::EACCES => NoSearchError.into(),
            e => DiskError::from_errno(e),
        }
    }

    /// Whether the error only says that the entry (or one of its parents) isn't there.
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            DiskError::Path(PathError::MissingComponent(_) | PathError::NonDirComponent(_))
        )
    }
}
