// folders.rs
use crate::app::ConvertError;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory containing the running executable.
pub fn base_directory() -> Result<PathBuf, ConvertError> {
    let exe = env::current_exe()?;
    match exe.parent() {
        Some(parent) => Ok(parent.to_path_buf()),
        None => Err(ConvertError::Config(format!(
            "executable {} has no parent directory",
            exe.display()
        ))),
    }
}

/// Replace `target` with a fresh recursive copy of `source`.
///
/// An existing `target` is removed first, no merging. Symlinks are
/// followed and their contents copied.
pub fn rebuild_copy(source: &Path, target: &Path) -> Result<(), ConvertError> {
    if !source.is_dir() {
        return Err(ConvertError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", source.display()),
        )));
    }
    if target.exists() {
        fs::remove_dir_all(target)?;
    }
    fs::create_dir_all(target)?;

    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry?;
        let relative_path = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ConvertError::Io(io::Error::new(io::ErrorKind::Other, e)))?;
        let target_path = target.join(relative_path);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path)?;
        } else {
            fs::copy(entry.path(), &target_path)?;
        }
    }
    Ok(())
}

/// Names of the entries directly inside `dir`, in listing order.
pub fn list_entry_names(dir: &Path) -> Result<Vec<OsString>, ConvertError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name());
    }
    Ok(names)
}
