use std::ffi::CStr;
use std::mem::{self, MaybeUninit};

use libc::{c_int, mode_t, stat as Stat};

use crate::fs::error::{DiskError, InterruptError};
use crate::fs::syscall::err_no;

const READ_CHUNK: usize = 4096;

/// An open file descriptor, closed when dropped.
#[derive(Debug)]
pub(crate) struct Fd(pub c_int);

impl Fd {
    pub fn open(pathname: &CStr, flags: c_int, mode: mode_t) -> Result<Fd, DiskError> {
        // SAFETY: pathname is a valid, null-terminated string for the duration of the call.
        match unsafe { libc::open(pathname.as_ptr(), flags | libc::O_CLOEXEC, mode) } {
            -1 => Err(DiskError::from_errno(err_no())),
            fd => Ok(Fd(fd)),
        }
    }

    pub fn stat(&self) -> Result<Stat, DiskError> {
        let mut raw_meta: MaybeUninit<Stat> = MaybeUninit::uninit();
        // SAFETY: raw_meta is a valid, writable stat buffer.
        if unsafe { libc::fstat(self.0, raw_meta.as_mut_ptr()) } == -1 {
            Err(DiskError::from_errno(err_no()))?
        }
        // SAFETY: fstat either initializes raw_meta or returns an error, handled above.
        Ok(unsafe { raw_meta.assume_init() })
    }

    /// Reads into `buf`, retrying on interrupts. Returns 0 only at the end of the file.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, DiskError> {
        loop {
            // SAFETY: buf is valid for writes of buf.len() bytes.
            match unsafe { libc::read(self.0, buf.as_mut_ptr().cast(), buf.len()) } {
                -1 => match DiskError::from_errno(err_no()) {
                    DiskError::Interrupt(InterruptError) => continue,
                    e => Err(e)?,
                },
                count => return Ok(count as usize),
            }
        }
    }

    /// Reads up to `limit` bytes, stopping early only at the end of the file. The buffer grows
    /// with what is actually read, so `limit` can be far larger than the file.
    pub fn read_up_to(&self, limit: usize) -> Result<Vec<u8>, DiskError> {
        let mut data = Vec::new();
        let mut chunk = [0; READ_CHUNK];
        while data.len() < limit {
            let want = (limit - data.len()).min(READ_CHUNK);
            match self.read(&mut chunk[..want])? {
                0 => break,
                count => data.extend_from_slice(&chunk[..count]),
            }
        }
        Ok(data)
    }

    pub fn write_all(&self, mut buf: &[u8]) -> Result<(), DiskError> {
        while !buf.is_empty() {
            // SAFETY: buf is valid for reads of buf.len() bytes.
            match unsafe { libc::write(self.0, buf.as_ptr().cast(), buf.len()) } {
                -1 => match DiskError::from_errno(err_no()) {
                    DiskError::Interrupt(InterruptError) => continue,
                    e => Err(e)?,
                },
                count => buf = &buf[count as usize..],
            }
        }
        Ok(())
    }

    pub fn close(self) -> Result<(), DiskError> {
        let fd = self.0;
        mem::forget(self);
        // SAFETY: close invalidates the descriptor regardless of the outcome, and self has been
        // forgotten so Drop won't close it a second time.
        if unsafe { libc::close(fd) } == -1 {
            match DiskError::from_errno(err_no()) {
                // Linux releases the descriptor even when interrupted.
                DiskError::Interrupt(InterruptError) => (),
                e => Err(e)?,
            }
        }
        Ok(())
    }
}

impl Drop for Fd {
    fn drop(&mut self) {
        // SAFETY: After this, the file descriptor is invalidated but we are dropping self so it
        // doesn't matter.
        if unsafe { libc::close(self.0) } == -1 {
            tracing::warn!(fd = self.0, errno = err_no(), "error while dropping file descriptor");
        }
    }
}
