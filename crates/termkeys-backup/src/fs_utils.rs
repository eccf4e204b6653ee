use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Turns `raw` into an absolute, lexically normalised path. A leading `~` is
/// replaced by `home` when one is given; relative paths are anchored at the
/// current directory. Trailing separators and `.` segments are dropped and
/// `..` pops the preceding segment, so the result always names the entry
/// itself and never something inside it.
pub fn resolve_target_path(raw: &Path, home: Option<&Path>) -> io::Result<PathBuf> {
    let expanded = match home {
        Some(home) => expand_home(raw, home),
        None => raw.to_path_buf(),
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()?.join(expanded)
    };
    Ok(normalize(&absolute))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

fn expand_home(raw: &Path, home: &Path) -> PathBuf {
    let mut components = raw.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => home.join(components.as_path()),
        _ => raw.to_path_buf(),
    }
}

/// Removes whatever occupies `path`. Files and symlinks are unlinked,
/// directories removed recursively. Nothing there is not an error.
pub fn remove_path_if_exists(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match removed {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
