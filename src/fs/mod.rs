#![cfg(target_os = "linux")]

pub mod path;

mod copy;
mod directory;
mod error;
mod fd;
mod file_type;
mod panic;
mod status;
mod syscall;

mod tests;

pub use copy::*;
pub use error::*;
pub use file_type::*;
pub use path::Path;
pub use status::{StatusInfo, Timestamp};
