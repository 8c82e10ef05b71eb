#![cfg(test)]

use std::collections::BTreeSet;

use serial_test::parallel;

use super::path::{NAME_MAX, PATH_MAX};
use super::*;
use crate::magic::FileKind;

/// A fresh temporary directory, removed along with its contents when dropped.
struct Scratch(Path);

impl Scratch {
    fn new() -> Scratch {
        Scratch(Path::temporary_directory().expect("failed to create temporary directory"))
    }

    fn join(&self, name: &str) -> Path {
        let mut path = self.0.clone();
        assert!(path.append_component(name));
        path
    }

    fn file(&self, name: &str, contents: &[u8]) -> Path {
        let path = self.join(name);
        std::fs::write(&path, contents).expect("failed to write test file");
        path
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = self.0.erase_from_disk(true);
    }
}

#[test]
#[parallel]
fn test_create_list_and_erase_tree() {
    let parent = Path::temporary_directory().expect("failed to create temporary directory");
    let mut sub = parent.clone();
    assert!(sub.append_component("sub"));

    assert!(sub.create_directory(true).expect("failed to create directory"));
    assert!(sub.is_directory().expect("failed to query directory"));

    let mut entries = BTreeSet::new();
    assert!(parent.list_directory(&mut entries).expect("failed to list directory"));
    assert_eq!(entries.len(), 1);
    assert!(entries.contains(&sub));
    assert_eq!(entries.first().map(|p| p.last_component().to_owned()), Some("sub".into()));

    assert!(parent.erase_from_disk(true).expect("failed to erase directory"));
    assert!(!parent.exists().expect("failed to query existence"));
    assert!(!sub.exists().expect("failed to query existence"));
}

#[test]
#[parallel]
fn test_create_directory_parents() {
    let scratch = Scratch::new();
    let mut nested = scratch.join("a");
    assert!(nested.append_component("b"));
    assert!(nested.append_component("c"));

    let err = nested.create_directory(false).unwrap_err();
    assert!(err.is_not_found(), "Missing parents should fail without create_parents.");

    assert!(nested.create_directory(true).expect("failed to create directories"));
    assert!(nested.is_directory().expect("failed to query directory"));
    assert!(nested.create_directory(true).expect("existing directories should be accepted"));
    assert!(nested.create_directory(false).unwrap_err().is_already_exists());

    let file = scratch.file("plain", b"");
    let mut below_file = file.clone();
    assert!(below_file.append_component("dir"));
    assert!(below_file.create_directory(true).is_err());

    assert!(!Path::new().create_directory(true).expect("empty paths are a negative result"));
}

#[test]
#[parallel]
fn test_create_file() {
    let scratch = Scratch::new();
    let file = scratch.join("empty.txt");
    assert!(file.create_file().expect("failed to create file"));
    assert!(file.is_file().expect("failed to query file"));
    assert!(!file.is_directory().expect("failed to query directory"));
    assert_eq!(file.size().expect("failed to query size"), Some(0));

    let dir_style = Path::from_os_str(format!("{}/dir/", scratch.0)).expect("valid path");
    assert!(!dir_style.create_file().expect("directory-style paths are a negative result"));
    assert!(!dir_style.exists().expect("failed to query existence"));

    let mut orphan = scratch.join("missing");
    assert!(orphan.append_component("file"));
    assert!(orphan.create_file().unwrap_err().is_not_found());
}

#[test]
#[parallel]
fn test_list_directory_negative_results() {
    let scratch = Scratch::new();
    let file = scratch.file("f", b"data");
    let mut entries = BTreeSet::new();
    entries.insert(Path::root());

    assert!(!file.list_directory(&mut entries).expect("listing a file is not an error"));
    assert!(!scratch.join("nothing").list_directory(&mut entries).expect("not an error"));
    assert_eq!(entries.len(), 1, "The output should be left alone.");

    assert!(scratch.0.list_directory(&mut entries).expect("failed to list directory"));
    assert!(entries.contains(&file));
    assert_eq!(entries.len(), 2);
}

#[test]
#[parallel]
fn test_status_info() {
    let scratch = Scratch::new();
    let file = scratch.file("status", b"hello");

    let info = file.status_info().expect("failed to query status").expect("file should exist");
    assert_eq!(info.file_size, 5);
    assert!(!info.is_dir);

    let dir_info = scratch.0.status_info().expect("failed to query status").expect("dir exists");
    assert!(dir_info.is_dir);

    assert_eq!(scratch.join("missing").status_info(), Ok(None));
    assert_eq!(Path::new().status_info(), Ok(None));

    let defaults = StatusInfo::default();
    assert_eq!((defaults.mode, defaults.user, defaults.group), (0o777, 999, 999));
}

#[test]
#[parallel]
fn test_set_disk_status() {
    let scratch = Scratch::new();
    let file = scratch.file("stamped", b"");

    let wanted = StatusInfo {
        mode: 0o640,
        mod_time: Timestamp::new(1_000_000_000, 500),
        ..StatusInfo::default()
    };
    file.set_disk_status(&wanted).expect("failed to set status");

    let info = file.status_info().expect("failed to query status").expect("file should exist");
    assert_eq!(info.mode & 0o7777, 0o640);
    assert_eq!(info.mod_time, Timestamp::new(1_000_000_000, 500));
    assert_eq!(file.modified(), Ok(Some(Timestamp::new(1_000_000_000, 500))));

    assert!(scratch.join("missing").set_disk_status(&wanted).unwrap_err().is_not_found());
}

#[test]
#[parallel]
fn test_permissions() {
    let scratch = Scratch::new();
    let file = scratch.file("script", b"#!/bin/sh\n");
    let no_exec = StatusInfo {
        mode: 0o644,
        ..StatusInfo::default()
    };
    file.set_disk_status(&no_exec).expect("failed to set status");

    assert!(file.can_read());
    assert!(file.can_write());
    assert!(!file.can_execute());

    file.make_executable_on_disk();
    assert!(file.can_execute());
    file.make_readable_on_disk();
    file.make_writeable_on_disk();
    assert!(file.can_read() && file.can_write());

    assert!(!scratch.0.can_execute(), "Directories are searched, not executed.");
    assert!(!scratch.join("missing").can_read());
    assert!(!Path::new().can_write());

    // Best effort, so nothing to report for missing entries.
    scratch.join("missing").make_readable_on_disk();
}

#[test]
#[parallel]
fn test_exists_and_kinds() {
    let scratch = Scratch::new();
    let file = scratch.file("kind", b"");

    assert_eq!(file.exists(), Ok(true));
    assert_eq!(scratch.0.exists(), Ok(true));
    assert_eq!(scratch.join("missing").exists(), Ok(false));
    assert_eq!(Path::new().exists(), Ok(false));

    let mut below_file = file.clone();
    assert!(below_file.append_component("x"));
    assert_eq!(below_file.exists(), Ok(false), "A file used as a directory doesn't exist.");

    assert_eq!(Path::root().is_root_directory(), Ok(true));
    assert_eq!(Path::from_os_str("/./").expect("valid path").is_root_directory(), Ok(true));
    assert_eq!(scratch.0.is_root_directory(), Ok(false));
}

#[test]
#[parallel]
fn test_make_unique() {
    let scratch = Scratch::new();
    let fresh = scratch.join("fresh");
    let mut reused = fresh.clone();
    reused.make_unique(true).expect("failed to make unique");
    assert_eq!(reused, fresh, "A path that doesn't exist should be kept when reusing.");

    let taken = scratch.file("taken", b"");
    let mut seen = BTreeSet::new();
    for _ in 0..8 {
        let mut unique = taken.clone();
        unique.make_unique(true).expect("failed to make unique");
        assert_ne!(unique, taken);
        assert!(unique.as_os_str().to_string_lossy().starts_with(&taken.to_string()));
        assert_eq!(unique.exists(), Ok(false));
        assert!(seen.insert(unique), "Every call should produce a fresh name.");
    }

    let mut forced = fresh.clone();
    forced.make_unique(false).expect("failed to make unique");
    assert_ne!(forced, fresh);

    // Nothing is claimed, so the name can still be taken by someone else before it is used.
    assert!(forced.create_file().expect("failed to create file"));
    assert_eq!(forced.exists(), Ok(true));

    assert!(Path::new().make_unique(true).unwrap_err().is_empty_path());
}

#[test]
#[parallel]
fn test_create_unique_temporary_file() {
    let scratch = Scratch::new();
    let start = scratch.join("tmpfile");

    let mut first = start.clone();
    first.create_unique_temporary_file(false).expect("failed to create temporary file");
    let mut second = start.clone();
    second.create_unique_temporary_file(false).expect("failed to create temporary file");

    assert_ne!(first, second);
    assert_ne!(first, start);
    assert_eq!(first.is_file(), Ok(true));
    assert_eq!(second.is_file(), Ok(true));
    assert_eq!(start.exists(), Ok(false));

    let mut reused = start.clone();
    reused.create_unique_temporary_file(true).expect("failed to create temporary file");
    assert_eq!(reused, start, "A free name should be claimed as is when reusing.");
    assert_eq!(start.is_file(), Ok(true));

    let mut again = start.clone();
    again.create_unique_temporary_file(true).expect("failed to create temporary file");
    assert_ne!(again, start, "A taken name should not be reused.");
}

#[test]
#[parallel]
fn test_rename_on_disk() {
    let scratch = Scratch::new();
    let from = scratch.file("from", b"moved");
    let to = scratch.join("to");

    from.rename_on_disk(&to).expect("failed to rename");
    assert_eq!(from.exists(), Ok(false));
    assert_eq!(to.size(), Ok(Some(5)));

    assert!(from.rename_on_disk(&to).unwrap_err().is_not_found());
}

#[test]
#[parallel]
fn test_erase_from_disk() {
    let scratch = Scratch::new();
    assert_eq!(scratch.join("missing").erase_from_disk(true), Ok(false));
    assert_eq!(Path::new().erase_from_disk(false), Ok(false));

    let dir = scratch.join("full");
    assert!(dir.create_directory(false).expect("failed to create directory"));
    let mut inner = dir.clone();
    assert!(inner.append_component("inner"));
    assert!(inner.create_file().expect("failed to create file"));

    assert!(dir.erase_from_disk(false).unwrap_err().is_not_empty());
    assert_eq!(inner.exists(), Ok(true));

    let link = scratch.join("link");
    std::os::unix::fs::symlink(&dir, &link).expect("failed to create symlink");
    assert_eq!(link.erase_from_disk(true), Ok(true));
    assert_eq!(inner.exists(), Ok(true), "Symlinks should be removed, not followed.");

    assert_eq!(dir.erase_from_disk(true), Ok(true));
    assert_eq!(dir.exists(), Ok(false));
}

#[test]
#[parallel]
fn test_magic_numbers() {
    let scratch = Scratch::new();
    let archive = scratch.file("lib.a", b"!<arch>\nfoo.o/");
    let bytecode = scratch.file("prog.bc", b"llvm\x01\x02");
    let compressed = scratch.file("prog.bcz", b"llvc0");
    let text = scratch.file("notes.txt", b"ll");

    assert!(archive.is_archive());
    assert!(bytecode.is_bytecode());
    assert!(compressed.is_compressed_bytecode());
    assert_eq!(text.file_kind(), FileKind::Unknown);
    assert_eq!(scratch.0.file_kind(), FileKind::Unknown, "Directories have no magic number.");
    assert_eq!(scratch.join("missing").file_kind(), FileKind::Unknown);

    assert_eq!(text.magic_number(8), Ok(Some(b"ll".to_vec())), "Short files give what they have.");
    assert_eq!(bytecode.magic_number(4), Ok(Some(b"llvm".to_vec())));
    assert_eq!(scratch.join("missing").magic_number(4), Ok(None));
    assert_eq!(scratch.0.magic_number(4), Ok(None));

    assert!(bytecode.has_magic_number(b"llvm"));
    assert!(!bytecode.has_magic_number(b"llvc"));
    assert!(!text.has_magic_number(b"llvm"), "Files shorter than the magic number don't match.");
    assert!(!scratch.join("missing").has_magic_number(b"llvm"));
}

#[test]
#[parallel]
fn test_magic_number_with_huge_length() {
    let scratch = Scratch::new();
    let small = scratch.file("small", b"llvm");
    assert_eq!(small.magic_number(usize::MAX), Ok(Some(b"llvm".to_vec())));

    let contents: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    let large = scratch.file("large", &contents);
    assert_eq!(large.magic_number(usize::MAX), Ok(Some(contents.clone())));
    assert_eq!(large.magic_number(5000), Ok(Some(contents[..5000].to_vec())));
    assert_eq!(large.magic_number(0), Ok(Some(Vec::new())));
}

#[test]
#[parallel]
fn test_is_dynamic_library() {
    let scratch = Scratch::new();
    let by_name = scratch.file("libfoo.so", b"");

    let mut header = vec![0u8; 64];
    header[..4].copy_from_slice(b"\x7fELF");
    header[5] = 1;
    header[16] = 3;
    let by_contents = scratch.file("plugin", &header);
    header[16] = 2;
    let executable = scratch.file("program", &header);

    assert!(by_name.is_dynamic_library());
    assert!(by_contents.is_dynamic_library());
    assert!(!executable.is_dynamic_library());
    assert!(!scratch.join("libmissing.so").is_dynamic_library());
}

#[test]
#[parallel]
fn test_copy_file() {
    let scratch = Scratch::new();
    let src = scratch.file("src", b"some contents");
    let dest = scratch.join("dest");

    copy_file(&dest, &src).expect("failed to copy");
    assert_eq!(std::fs::read(&dest).expect("failed to read copy"), b"some contents");

    let other = scratch.file("other", b"x");
    copy_file(&dest, &other).expect("failed to copy over existing file");
    assert_eq!(dest.size(), Ok(Some(1)));
}

#[test]
#[parallel]
fn test_copy_missing_source() {
    let scratch = Scratch::new();
    let src = scratch.join("missing");
    let dest = scratch.join("dest");

    let err = copy_file(&dest, &src).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(dest.exists(), Ok(false), "The destination should not be created.");
}

#[test]
#[parallel]
fn test_copy_failure_removes_destination() {
    let scratch = Scratch::new();
    let dest = scratch.join("dest");

    // Opening a directory succeeds, reading it fails part way.
    assert!(copy_file(&dest, &scratch.0).unwrap_err().is_is_dir());
    assert_eq!(dest.exists(), Ok(false), "A partial copy should be removed.");
}

#[test]
#[parallel]
fn test_list_directory_too_deep() {
    use std::os::fd::AsRawFd;

    let scratch = Scratch::new();
    let name = "d".repeat(NAME_MAX);
    let mut deep = scratch.0.clone();
    while deep.as_bytes().len() + NAME_MAX + 1 < PATH_MAX {
        assert!(deep.append_component(&name));
    }
    assert!(deep.create_directory(true).expect("failed to create directories"));

    // The entry can only be made relative to its parent, its full path is too long.
    let parent = std::fs::File::open(&deep).expect("failed to open directory");
    let c_name = std::ffi::CString::new(name.clone()).expect("no null bytes");
    // SAFETY: The descriptor is open and c_name is null-terminated.
    let res = unsafe { libc::mkdirat(parent.as_raw_fd(), c_name.as_ptr(), 0o777) };
    assert_eq!(res, 0, "failed to create entry below the deepest directory");
    assert!(!deep.clone().append_component(&name));

    let mut entries = BTreeSet::new();
    let err = deep.list_directory(&mut entries).unwrap_err();
    assert!(matches!(err, DiskError::Path(PathError::PathLength(_))));

    let err = scratch.0.erase_from_disk(true).unwrap_err();
    assert!(matches!(err, DiskError::Path(PathError::PathLength(_))));

    drop(parent);
    std::fs::remove_dir_all(&scratch.0).expect("failed to clean up");
}
