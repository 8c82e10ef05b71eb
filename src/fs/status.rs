use std::ffi::CStr;
use std::mem::MaybeUninit;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use libc::stat as Stat;

use crate::fs::FileType;
use crate::fs::error::DiskError;
use crate::fs::syscall::err_no;

/// A point in time, as seconds and nanoseconds relative to the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: i64,
}

impl Timestamp {
    pub const fn new(seconds: i64, nanoseconds: i64) -> Timestamp {
        Timestamp { seconds, nanoseconds }
    }

    pub(crate) const fn to_timespec(self) -> libc::timespec {
        libc::timespec {
            tv_sec: self.seconds as libc::time_t,
            tv_nsec: self.nanoseconds as libc::c_long,
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(value: SystemTime) -> Self {
        match value.duration_since(UNIX_EPOCH) {
            Ok(after) => Timestamp::new(after.as_secs() as i64, after.subsec_nanos() as i64),
            Err(before) => {
                let before = before.duration();
                // Normalize so that nanoseconds stays positive.
                match before.subsec_nanos() {
                    0 => Timestamp::new(-(before.as_secs() as i64), 0),
                    n => Timestamp::new(-(before.as_secs() as i64) - 1, 1_000_000_000 - n as i64),
                }
            },
        }
    }
}

impl From<Timestamp> for SystemTime {
    fn from(value: Timestamp) -> Self {
        let nanos = Duration::from_nanos(value.nanoseconds.clamp(0, 999_999_999) as u64);
        if value.seconds >= 0 {
            UNIX_EPOCH + Duration::from_secs(value.seconds as u64) + nanos
        } else {
            UNIX_EPOCH - Duration::from_secs(value.seconds.unsigned_abs()) + nanos
        }
    }
}

/// A snapshot of an entry's status, taken when it was queried and never updated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Size of the entry in bytes.
    pub file_size: u64,
    /// Time of the last modification.
    pub mod_time: Timestamp,
    /// Mode (permission) bits, without the file type.
    pub mode: u32,
    /// User ID of the owner, 999 if not applicable.
    pub user: u32,
    /// Group ID of the owner, 999 if not applicable.
    pub group: u32,
    pub is_dir: bool,
}

impl Default for StatusInfo {
    fn default() -> Self {
        StatusInfo {
            file_size: 0,
            mod_time: Timestamp::default(),
            mode: 0o777,
            user: 999,
            group: 999,
            is_dir: false,
        }
    }
}

impl StatusInfo {
    #[allow(clippy::unnecessary_cast)]
    pub(crate) fn from_stat(raw: &Stat) -> StatusInfo {
        StatusInfo {
            file_size: raw.st_size as u64,
            mod_time: Timestamp::new(raw.st_mtime as i64, raw.st_mtime_nsec as i64),
            mode: (raw.st_mode & !libc::S_IFMT) as u32,
            user: raw.st_uid,
            group: raw.st_gid,
            is_dir: FileType::from_stat_mode(raw.st_mode).is_directory(),
        }
    }
}

/// Queries the entry at `pathname`, following symlinks unless `no_follow`. `Ok(None)` if there is
/// no such entry.
pub(crate) fn stat(pathname: &CStr, no_follow: bool) -> Result<Option<Stat>, DiskError> {
    let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
    // SAFETY: pathname is null-terminated and raw_meta is a valid, writable stat buffer.
    let res = unsafe {
        if no_follow {
            libc::lstat(pathname.as_ptr(), raw_meta.as_mut_ptr())
        } else {
            libc::stat(pathname.as_ptr(), raw_meta.as_mut_ptr())
        }
    };
    if res == -1 {
        return match DiskError::from_stat_errno(err_no()) {
            e if e.is_not_found() => Ok(None),
            e => Err(e),
        };
    }
    // SAFETY: stat either initializes raw_meta or returns an error, handled above.
    Ok(Some(unsafe { raw_meta.assume_init() }))
}
