//! Collision-avoiding backups of the input library.
//!
//! Before any write, the original file is copied to a `.orig` sibling. An
//! existing backup is never overwritten: `lib.kicad_sym.orig`, then
//! `lib.kicad_sym.orig.1`, `.orig.2`, and so on until an unused name is found.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copy `path` to the first unused `<name>.orig[.N]` sibling and return the
/// backup path.
pub fn create_numbered_backup(path: &Path) -> io::Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?
        .to_string_lossy()
        .into_owned();

    let mut candidate = path.with_file_name(format!("{file_name}.orig"));
    let mut counter = 0u32;
    while candidate.exists() {
        counter += 1;
        candidate = path.with_file_name(format!("{file_name}.orig.{counter}"));
    }

    log::debug!(
        "backing up {} to {}",
        path.display(),
        candidate.display()
    );
    fs::copy(path, &candidate)?;
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_backup_gets_plain_orig_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.kicad_sym");
        fs::write(&lib, "(kicad_symbol_lib)").unwrap();

        let backup = create_numbered_backup(&lib).unwrap();
        assert_eq!(backup, dir.path().join("lib.kicad_sym.orig"));
        assert_eq!(fs::read_to_string(&backup).unwrap(), "(kicad_symbol_lib)");
        // the original is copied, not moved
        assert!(lib.exists());
    }

    #[test]
    fn test_existing_backups_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.kicad_sym");
        fs::write(&lib, "current").unwrap();
        fs::write(dir.path().join("lib.kicad_sym.orig"), "old-1").unwrap();
        fs::write(dir.path().join("lib.kicad_sym.orig.1"), "old-2").unwrap();

        let backup = create_numbered_backup(&lib).unwrap();
        assert_eq!(backup, dir.path().join("lib.kicad_sym.orig.2"));
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.kicad_sym.orig")).unwrap(),
            "old-1"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("lib.kicad_sym.orig.1")).unwrap(),
            "old-2"
        );
        assert_eq!(fs::read_to_string(&backup).unwrap(), "current");
    }

    #[test]
    fn test_missing_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(create_numbered_backup(&dir.path().join("nope.kicad_sym")).is_err());
    }
}
