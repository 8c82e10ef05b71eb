use derive_more::IsVariant;

/// The kind of an entry, as reported by the file type bits of its mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum FileType {
    BlockDevice,
    CharDevice,
    Directory,
    Fifo,
    Symlink,
    Regular,
    Socket,
    Other,
}

use FileType::*;

impl FileType {
    #[inline(always)]
    pub(crate) const fn from_stat_mode(st_mode: libc::mode_t) -> FileType {
        match st_mode & libc::S_IFMT {
            libc::S_IFBLK => BlockDevice,
            libc::S_IFCHR => CharDevice,
            libc::S_IFDIR => Directory,
            libc::S_IFIFO => Fifo,
            libc::S_IFLNK => Symlink,
            libc::S_IFREG => Regular,
            libc::S_IFSOCK => Socket,
            _ => Other,
        }
    }
}
