//! Paths on the host file system, and the basic disk operations performed through them.
//!
//! The centre of this crate is [`Path`](fs::Path): a value that is either empty or holds text that
//! is syntactically valid for the host OS, and never anything in between. Paths can be taken apart
//! and put back together without touching the disk, derived from the well-known locations of the
//! system (the root, the user's home, the temporary and configuration directories, library search
//! paths), and then used to query or change the entries they name.
//!
//! # Error Handling
//! Disk operations separate two kinds of outcome. Expected ones, like an entry that doesn't exist,
//! a path that names the wrong kind of entry or a suffix that isn't there, are plain `bool` or
//! [`Option`] results, because callers branch on them all the time. Hard failures, like a denied
//! permission or a full disk, are returned as a [`DiskError`](fs::DiskError).
//!
//! Errors are strongly typed: every failure is its own (zero-sized) struct implementing
//! [`Error`](std::error::Error), and operations return enums of those structs rather than boxed
//! trait objects.
//!
//! # Dependencies
//! The [`fs`] module relies on `libc` for its thin syscall wrappers and only builds on Linux. The
//! [`magic`] module is pure and builds everywhere. Disk mutations are reported through `tracing`,
//! so they show up in whatever subscriber the application installs.
//!
//! # Configuration
//! The environment variables and build-time settings that steer the well-known locations are
//! listed in [`config`].

// #![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod fs;
pub mod magic;
