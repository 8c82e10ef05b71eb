use crate::fs::error::{AlreadyExistsError, DiskError, EmptyPathError, UnexpectedError};
use crate::fs::path::{Path, validity};

const UNIQUE_LEN: usize = 6;
const MAX_ATTEMPTS: usize = 128;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TEMP_FILE_MODE: libc::mode_t = 0o600;

fn random_tag() -> Result<[u8; UNIQUE_LEN], DiskError> {
    let mut tag = [0u8; UNIQUE_LEN];
    getrandom::getrandom(&mut tag)
        .map_err(|e| UnexpectedError(e.raw_os_error().unwrap_or(0)))?;
    for ch in &mut tag {
        *ch = ALPHABET[*ch as usize % ALPHABET.len()];
    }
    Ok(tag)
}

impl Path {
    /// The text of the next name to try: this path followed by `-` and a random tag.
    fn unique_candidate(&self) -> Result<Path, DiskError> {
        let base = validity::trim_trailing_separators(self.as_bytes());
        let mut text = Vec::with_capacity(base.len() + UNIQUE_LEN + 1);
        text.extend_from_slice(base);
        text.push(b'-');
        text.extend_from_slice(&random_tag()?);

        validity::validate(&text)?;
        Ok(Path::from_valid(text))
    }

    /// Changes the path to one that nothing exists at yet. If `reuse_existing` is set and nothing
    /// exists at the current path, it is kept. Otherwise a random tag is appended to the current
    /// text until an unused name is found.
    ///
    /// Nothing is created, so another process may take the name before it is used. Use
    /// [`create_unique_temporary_file`](Path::create_unique_temporary_file) to claim it instead.
    pub fn make_unique(&mut self, reuse_existing: bool) -> Result<(), DiskError> {
        if self.is_empty() {
            Err(EmptyPathError)?
        }
        if reuse_existing && !self.exists()? {
            return Ok(());
        }

        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.unique_candidate()?;
            if !candidate.exists()? {
                tracing::trace!(from = %self, to = %candidate, "made path unique");
                *self = candidate;
                return Ok(());
            }
        }
        Err(AlreadyExistsError.into())
    }

    /// Like [`make_unique`](Path::make_unique), but also creates an empty file at the new path.
    /// Each name is claimed with an exclusive create, so no other process can take it between the
    /// check and the creation.
    pub fn create_unique_temporary_file(&mut self, reuse_existing: bool) -> Result<(), DiskError> {
        if self.is_empty() {
            Err(EmptyPathError)?
        }
        if reuse_existing {
            match self.create_file_exclusive(TEMP_FILE_MODE) {
                Ok(()) => {
                    tracing::debug!(path = %self, "created temporary file");
                    return Ok(());
                },
                Err(DiskError::AlreadyExists(_)) => (),
                Err(e) => Err(e)?,
            }
        }

        for _ in 0..MAX_ATTEMPTS {
            let candidate = self.unique_candidate()?;
            match candidate.create_file_exclusive(TEMP_FILE_MODE) {
                Ok(()) => {
                    tracing::debug!(path = %candidate, "created temporary file");
                    *self = candidate;
                    return Ok(());
                },
                Err(DiskError::AlreadyExists(_)) => continue,
                Err(e) => Err(e)?,
            }
        }
        Err(AlreadyExistsError.into())
    }
}
