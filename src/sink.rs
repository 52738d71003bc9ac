//! Destinations for rendered hex lines

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{GenError, GenResult};

/// Receives one named vector file at a time
pub trait VectorSink {
    fn write_lines(&mut self, name: &str, lines: &[String]) -> GenResult<()>;
}

/// Writes each vector file into a directory, truncating existing files
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl VectorSink for FileSink {
    fn write_lines(&mut self, name: &str, lines: &[String]) -> GenResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| GenError::io(&self.dir, e))?;

        let path = self.path_for(name);
        let file = File::create(&path).map_err(|e| GenError::io(&path, e))?;
        let mut out = BufWriter::new(file);
        for line in lines {
            writeln!(out, "{}", line).map_err(|e| GenError::io(&path, e))?;
        }
        out.flush().map_err(|e| GenError::io(&path, e))?;

        debug!(path = %path.display(), lines = lines.len(), "wrote vector file");
        Ok(())
    }
}

/// Keeps vector files in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub files: BTreeMap<String, Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

impl VectorSink for MemorySink {
    fn write_lines(&mut self, name: &str, lines: &[String]) -> GenResult<()> {
        self.files.insert(name.to_string(), lines.to_vec());
        Ok(())
    }
}
