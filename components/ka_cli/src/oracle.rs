//! Filesystem-backed import oracle

use ka_compiler::FileExists;
use std::path::Path;

/// [`FileExists`] backed by the real filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOracle;

impl FileExists for FsOracle {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }
}
