use crate::fs::error::DiskError;
use crate::fs::fd::Fd;
use crate::fs::path::Path;

const BUFFER_SIZE: usize = 64 * 1024;
const NEW_FILE_MODE: libc::mode_t = 0o666;

/// Copies the contents of `src` into `dest`, replacing anything already in `dest`.
///
/// If `src` can't be opened, `dest` is left alone. If the copy fails once `dest` has been opened,
/// the partial copy at `dest` is removed before the error is returned.
pub fn copy_file(dest: &Path, src: &Path) -> Result<(), DiskError> {
    let input = Fd::open(&src.to_c_string()?, libc::O_RDONLY, 0)?;
    let output = Fd::open(
        &dest.to_c_string()?,
        libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC,
        NEW_FILE_MODE,
    )?;

    match stream(&input, output) {
        Ok(()) => {
            tracing::debug!(from = %src, to = %dest, "copied file");
            Ok(())
        },
        Err(e) => {
            tracing::warn!(from = %src, to = %dest, error = %e, "copy failed, removing destination");
            if let Err(cleanup) = dest.erase_from_disk(false) {
                tracing::warn!(path = %dest, error = %cleanup, "failed to remove partial copy");
            }
            Err(e)
        },
    }
}

fn stream(input: &Fd, output: Fd) -> Result<(), DiskError> {
    let mut buf = vec![0; BUFFER_SIZE];
    loop {
        match input.read(&mut buf)? {
            0 => break,
            count => output.write_all(&buf[..count])?,
        }
    }
    // Delayed write errors only show up when closing.
    output.close()
}
