//! File helpers for the launcher's persisted state.

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use tempfile::NamedTempFile;

/// Write `contents` to `path` by renaming a sibling temporary file over it.
///
/// Parent directories are created as needed. Readers never observe a partially
/// written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(contents)?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn write_atomic_creates_missing_parents() {
        let temp = tempdir().expect("can create temporary directory");
        let target = temp.path().join("nested/state/file.json");

        write_atomic(&target, b"{}").expect("write should succeed");

        assert_eq!(fs::read_to_string(&target).expect("file exists"), "{}");
    }

    #[test]
    fn write_atomic_replaces_existing_content() {
        let temp = tempdir().expect("can create temporary directory");
        let target = temp.path().join("file.json");
        fs::write(&target, "old").expect("can seed file");

        write_atomic(&target, b"new").expect("write should succeed");

        assert_eq!(fs::read_to_string(&target).expect("file exists"), "new");
        let leftovers = fs::read_dir(temp.path())
            .expect("can list directory")
            .count();
        assert_eq!(leftovers, 1, "temporary file must not be left behind");
    }
}
