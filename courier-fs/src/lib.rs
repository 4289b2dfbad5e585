//! Capability-based file access for scenario inputs and report outputs.
//!
//! Every helper resolves an ambient directory handle with `cap-std` and then
//! operates relative to it, so callers only ever pass `camino` UTF-8 paths.
#![forbid(unsafe_code)]

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Open the file at `path` for reading.
///
/// # Errors
/// Returns the underlying I/O error when the file cannot be opened.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Whether the entry at `path` is a regular file rather than a directory
/// or other node.
///
/// # Errors
/// Returns the underlying I/O error when the entry or its parent directory
/// is missing or cannot be inspected; a missing entry reports
/// [`io::ErrorKind::NotFound`].
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_and_name(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Write `contents` to `path`, creating missing parent directories and
/// replacing any existing file.
///
/// # Errors
/// Returns the underlying I/O error when a directory cannot be created or
/// the file cannot be written.
pub fn write_utf8_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = parent_and_name(path)?;
    dir.write(name.as_str(), contents)
}

/// Create the parent directory of `path` if it is missing.
///
/// # Errors
/// Returns the underlying I/O error when the directory cannot be created.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, relative) = anchor_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    anchor.create_dir_all(&relative)
}

fn parent_and_name(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `dir` into an openable anchor (the filesystem root, a Windows
/// prefix or the working directory) and the path below it.
fn anchor_and_relative(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let mut components = dir.as_std_path().components();
    let anchor = match components.next() {
        Some(Component::Prefix(prefix)) => {
            let drive = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            if matches!(components.next(), Some(Component::RootDir)) {
                format!("{drive}{}", std::path::MAIN_SEPARATOR)
            } else {
                drive.to_owned()
            }
        }
        Some(Component::RootDir) => std::path::MAIN_SEPARATOR.to_string(),
        _ => {
            components = dir.as_std_path().components();
            ".".to_owned()
        }
    };
    let relative = Utf8PathBuf::from_path_buf(components.as_path().to_path_buf())
        .map_err(|_| io::Error::other("non-UTF-8 directory path"))?;
    let handle = fs_utf8::Dir::open_ambient_dir(anchor, ambient_authority())?;
    Ok((handle, relative))
}
