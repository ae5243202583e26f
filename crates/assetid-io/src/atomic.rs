//! Atomic file replacement:
//! - write to a temp file in the destination directory (avoids cross-device renames)
//! - flush + `sync_all`
//! - rename into place with replace semantics

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[derive(Debug)]
pub enum AtomicWriteError<E> {
    Io(io::Error),
    Writer(E),
}

impl<E> From<io::Error> for AtomicWriteError<E> {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` returns `Some("")` for bare file names like `out.xlsx`.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Run `write_fn` against a temp file next to `dest`, then move it over `dest`.
///
/// If `write_fn` fails the destination is left untouched.
pub fn atomic_write<T, E>(
    dest: &Path,
    write_fn: impl FnOnce(&mut File) -> Result<T, E>,
) -> Result<T, AtomicWriteError<E>> {
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    let out = write_fn(tmp.as_file_mut()).map_err(AtomicWriteError::Writer)?;

    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| AtomicWriteError::Io(err.error))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_writer_leaves_destination_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.csv");
        fs::write(&dest, "old").unwrap();

        let result: Result<(), AtomicWriteError<&str>> = atomic_write(&dest, |file| {
            file.write_all(b"partial").unwrap();
            Err("boom")
        });
        assert!(matches!(result, Err(AtomicWriteError::Writer("boom"))));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "old");

        atomic_write::<_, io::Error>(&dest, |file| file.write_all(b"new")).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested/deeper/out.csv");
        atomic_write::<_, io::Error>(&dest, |file| file.write_all(b"x")).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"x");
    }
}
