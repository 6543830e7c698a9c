//! Where generated source goes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Extension of every generated file.
pub const GENERATED_EXTENSION: &str = "kt";

pub trait CodeGenerator {
    type Sink: Write;

    /// Opens a fresh output file. The sink is closed when dropped.
    fn create_new_file(&mut self, package: &str, file_name: &str) -> io::Result<Self::Sink>;
}

/// `<package segments>/<file_name>.kt`
///
/// The extension is appended, so a dotted `file_name` keeps every part.
pub fn relative_path(package: &str, file_name: &str) -> PathBuf {
    let mut rel = PathBuf::new();
    for seg in package.split('.').filter(|s| !s.is_empty()) {
        rel.push(seg);
    }
    rel.push(format!("{file_name}.{GENERATED_EXTENSION}"));
    rel
}

/// A file name must stay a single path component below the package directory.
pub fn validate_file_name(file_name: &str) -> Result<(), String> {
    if file_name.is_empty() {
        return Err("file name must be non-empty".to_string());
    }
    if file_name.starts_with('.') || file_name.contains("..") {
        return Err(format!("file name must not start with '.' or contain '..': {file_name:?}"));
    }
    if let Some(c) = file_name
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(format!(
            "invalid file name char {c:?} (allowed letters, digits, '_', '-', '.'): {file_name:?}"
        ));
    }
    Ok(())
}

/// Writes generated files below a root directory.
#[derive(Debug, Clone)]
pub struct DirCodeGenerator {
    root: PathBuf,
}

impl DirCodeGenerator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirCodeGenerator { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, package: &str, file_name: &str) -> PathBuf {
        self.root.join(relative_path(package, file_name))
    }
}

impl CodeGenerator for DirCodeGenerator {
    type Sink = BufWriter<File>;

    fn create_new_file(&mut self, package: &str, file_name: &str) -> io::Result<Self::Sink> {
        validate_file_name(file_name)
            .map_err(|reason| io::Error::new(io::ErrorKind::InvalidInput, reason))?;
        let path = self.path_for(package, file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(BufWriter::new(File::create(&path)?))
    }
}

type FileMap = Rc<RefCell<BTreeMap<PathBuf, Vec<u8>>>>;

/// Keeps generated files in memory, keyed by [`relative_path`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCodeGenerator {
    files: FileMap,
}

impl MemoryCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, package: &str, file_name: &str) -> Option<String> {
        self.files
            .borrow()
            .get(&relative_path(package, file_name))
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }
}

impl CodeGenerator for MemoryCodeGenerator {
    type Sink = MemorySink;

    fn create_new_file(&mut self, package: &str, file_name: &str) -> io::Result<Self::Sink> {
        let path = relative_path(package, file_name);
        self.files.borrow_mut().insert(path.clone(), Vec::new());
        Ok(MemorySink {
            files: Rc::clone(&self.files),
            path,
        })
    }
}

#[derive(Debug)]
pub struct MemorySink {
    files: FileMap,
    path: PathBuf,
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut files = self.files.borrow_mut();
        let Some(contents) = files.get_mut(&self.path) else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("in-memory file removed: {}", self.path.display()),
            ));
        };
        contents.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
