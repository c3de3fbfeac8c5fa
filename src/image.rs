//! Whole-input loading. The decoder works on one in-memory image of the file.

use std::fs::File;
use std::io::{self, ErrorKind, Read};
use std::path::{Path, PathBuf};

/// The buffer grows in steps of this many bytes.
pub const READ_CHUNK: usize = 65536;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Error opening '{}': {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("Error reading file. fileSize={size}, fileExtent={extent}: {source}")]
    Read {
        size: usize,
        extent: usize,
        source: io::Error,
    },
    #[error("Out of memory. fileExtent={extent}")]
    OutOfMemory { extent: usize },
}

/// File contents plus the buffer extent reserved while reading.
#[derive(Debug, Clone)]
pub struct Image {
    pub bytes: Vec<u8>,
    pub extent: usize,
}

/// Read everything from `r`, growing the buffer [`READ_CHUNK`] bytes at a time.
pub fn read_image<R: Read>(mut r: R) -> Result<Image, LoadError> {
    let mut buf: Vec<u8> = Vec::new();
    let mut size = 0usize;
    let mut extent = 0usize;
    loop {
        if size >= extent {
            let next = extent + READ_CHUNK;
            buf.try_reserve_exact(READ_CHUNK)
                .map_err(|_| LoadError::OutOfMemory { extent: next })?;
            buf.resize(next, 0);
            extent = next;
        }
        match r.read(&mut buf[size..extent]) {
            Ok(0) => break,
            Ok(n) => size += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => return Err(LoadError::Read { size, extent, source }),
        }
    }
    buf.truncate(size);
    log::info!("loaded {} bytes (extent {})", size, extent);
    Ok(Image { bytes: buf, extent })
}

pub fn load_path(path: &Path) -> Result<Image, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_image(file)
}

/// Load `path`, or standard input when no path is given.
pub fn load(path: Option<&Path>) -> Result<Image, LoadError> {
    match path {
        Some(p) => load_path(p),
        None => read_image(io::stdin().lock()),
    }
}
