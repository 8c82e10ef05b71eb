//! The [`Path`] type: validated path text, the algebra for taking it apart and putting it back
//! together, the well-known locations of the system, and the disk operations performed through a
//! path.
//!
//! # Validity
//! A `Path` is either empty or syntactically valid for the host OS, see [`validate`]. Operations
//! that only work on the text (everything in [`Path`] that doesn't mention the disk) never touch
//! the file system.
//!
//! # Disk Operations
//! Every disk operation queries the OS afresh. Expected outcomes, like a missing entry or an entry
//! of the wrong kind, are returned as `false` or `None`. Only hard failures are returned as a
//! [`DiskError`](crate::fs::DiskError).

mod disk;
mod error;
mod mutate;
mod path;
mod unique;
mod validity;
mod well_known;


pub use error::*;
pub use path::*;
pub use validity::{NAME_MAX, PATH_MAX, SEPARATOR, is_valid_component, validate};
