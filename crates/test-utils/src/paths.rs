//! Scratch files for tests that exercise file-level entry points.

use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// File name in the style of the MERRA-2 subsetting service.
///
/// `date` is `YYYYMMDD`.
pub fn merra_filename(date: &str) -> String {
    format!("MERRA2_400.inst3_3d_asm_Np.{}.nc4.ascii", date)
}

/// Write a dump into `dir` and return its path.
pub fn write_dump(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create dump directory");
    }
    std::fs::write(&path, text).expect("Failed to write dump");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_dump_nested() {
        let dir = temp_test_dir();
        let path = write_dump(dir.path(), "2023/01/a.ascii", "x\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "x\n");
    }

    #[test]
    fn test_merra_filename() {
        assert_eq!(
            merra_filename("20230105"),
            "MERRA2_400.inst3_3d_asm_Np.20230105.nc4.ascii"
        );
    }
}
