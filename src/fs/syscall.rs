use std::io;

use libc::c_int;

pub fn err_no() -> c_int {
    io::Error::last_os_error().raw_os_error().unwrap_or(0)
}
