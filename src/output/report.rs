use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// Destination for reported (impure) paths.
pub trait ReportSink {
    /// Emits one reported path.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn report(&mut self, path: &Path, is_dir: bool) -> io::Result<()>;
}

/// Collects reported paths in memory, in emission order.
impl ReportSink for Vec<PathBuf> {
    fn report(&mut self, path: &Path, _is_dir: bool) -> io::Result<()> {
        self.push(path.to_path_buf());
        Ok(())
    }
}

/// Writes one path per line to any writer.
pub struct WriterSink<W: Write> {
    /// Destination
    writer: W,
    /// Append `/` to directories
    mark_dirs: bool,
}

impl<W: Write> WriterSink<W> {
    /// Creates a sink writing raw path bytes followed by a newline.
    pub fn new(writer: W, mark_dirs: bool) -> Self {
        Self { writer, mark_dirs }
    }

    /// Flushes the writer and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ReportSink for WriterSink<W> {
    fn report(&mut self, path: &Path, is_dir: bool) -> io::Result<()> {
        self.writer.write_all(path.as_os_str().as_bytes())?;
        if self.mark_dirs && is_dir {
            self.writer.write_all(b"/")?;
        }
        self.writer.write_all(b"\n")
    }
}
