use std::error::Error;

use derive_more::{Display, Error};

/// Errors that can only come from a bug (in this crate or in unsafe code elsewhere in the process)
/// and are therefore never handed back to the caller.
pub trait Panic: Error {
    fn panic(&self) -> ! {
        panic!("{}", self)
    }
}

#[derive(Debug, Display, Error)]
#[display("file descriptor corruption")]
pub struct BadFdPanic;
impl Panic for BadFdPanic {}

#[derive(Debug, Display, Error)]
#[display("pointer exceeded stack space")]
pub struct BadStackAddrPanic;
impl Panic for BadStackAddrPanic {}
