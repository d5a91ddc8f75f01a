//! Persisting an analysis result
//!
//! Output is one token per line, LF-terminated, UTF-8, with no header.

use crate::error::SinkError;
use crate::logging::codes;
use crate::result::AnalysisResult;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Destination for a finished result
pub trait TokenSink {
    fn write_result(&mut self, result: &AnalysisResult) -> Result<(), SinkError>;

    /// Human-readable destination name for diagnostics
    fn describe(&self) -> String;
}

/// Render tokens in the line format
pub fn write_tokens<W: Write>(writer: &mut W, result: &AnalysisResult) -> io::Result<()> {
    for token in result {
        writer.write_all(token.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// File destination replaced atomically
///
/// Tokens go to a temporary file next to the real destination, which is then
/// renamed over it. A failed write leaves any previous contents untouched.
/// Symlinked destinations are resolved first so the link survives and its
/// target receives the output. Special files, and files in directories that
/// refuse new entries, are truncated and written in place.
#[derive(Debug, Clone)]
pub struct FileSink {
    destination: PathBuf,
}

impl FileSink {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self {
            destination: destination.into(),
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The file a write actually lands on
    fn target(&self) -> PathBuf {
        if let Ok(resolved) = fs::canonicalize(&self.destination) {
            return resolved;
        }

        // Dangling link: create the file it names
        match fs::read_link(&self.destination) {
            Ok(link) if link.is_absolute() => link,
            Ok(link) => staging_dir(&self.destination).join(link),
            Err(_) => self.destination.clone(),
        }
    }

    fn create_error(&self, source: io::Error) -> SinkError {
        SinkError::Create {
            destination: self.destination.clone(),
            source,
        }
    }

    fn write_error(&self, source: io::Error) -> SinkError {
        SinkError::Write {
            destination: self.destination.clone(),
            source,
        }
    }

    fn stage(&self, target: &Path, result: &AnalysisResult) -> Result<NamedTempFile, SinkError> {
        let mut staged =
            NamedTempFile::new_in(staging_dir(target)).map_err(|e| self.create_error(e))?;

        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            write_tokens(&mut writer, result).map_err(|e| self.write_error(e))?;
            writer.flush().map_err(|e| self.write_error(e))?;
        }

        staged
            .as_file()
            .sync_all()
            .map_err(|e| self.write_error(e))?;
        self.copy_permissions(target, &staged)?;

        Ok(staged)
    }

    /// Keep the mode of an existing destination
    fn copy_permissions(&self, target: &Path, staged: &NamedTempFile) -> Result<(), SinkError> {
        let permissions = match fs::metadata(target) {
            Ok(metadata) => Some(metadata.permissions()),
            Err(_) => default_permissions(),
        };

        if let Some(permissions) = permissions {
            staged
                .as_file()
                .set_permissions(permissions)
                .map_err(|e| self.write_error(e))?;
        }

        Ok(())
    }

    fn replace(&self, target: &Path, result: &AnalysisResult) -> Result<(), SinkError> {
        let staged = match self.stage(target, result) {
            Ok(staged) => staged,
            Err(SinkError::Create { source, .. })
                if source.kind() == io::ErrorKind::PermissionDenied && target.is_file() =>
            {
                crate::log_debug!("Directory refuses staging, writing in place",
                    "destination" => self.destination.display()
                );
                return self.write_in_place(target, result);
            }
            Err(err) => return Err(err),
        };

        staged
            .persist(target)
            .map_err(|e| self.write_error(e.error))?;
        Ok(())
    }

    /// Truncate then write
    fn write_in_place(&self, target: &Path, result: &AnalysisResult) -> Result<(), SinkError> {
        let file = File::create(target).map_err(|e| self.create_error(e))?;
        let mut writer = BufWriter::new(file);
        write_tokens(&mut writer, result).map_err(|e| self.write_error(e))?;
        writer.flush().map_err(|e| self.write_error(e))
    }
}

fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

impl TokenSink for FileSink {
    fn write_result(&mut self, result: &AnalysisResult) -> Result<(), SinkError> {
        let target = self.target();
        let outcome = match fs::metadata(&target) {
            Ok(metadata) if !metadata.is_file() && !metadata.is_dir() => {
                self.write_in_place(&target, result)
            }
            _ => self.replace(&target, result),
        };

        outcome.map_err(|err| {
            crate::log_error!(err.code(), "Cannot write output", "reason" => &err);
            err
        })?;

        crate::log_success!(
            codes::success::RESULT_PERSISTED,
            "Class list written",
            "destination" => self.destination.display(),
            "tokens" => result.len()
        );

        Ok(())
    }

    fn describe(&self) -> String {
        self.destination.display().to_string()
    }
}

/// Sink over any writer, such as stdout
pub struct WriterSink<W: Write> {
    writer: W,
    name: String,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, name: impl Into<String>) -> Self {
        Self {
            writer,
            name: name.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TokenSink for WriterSink<W> {
    fn write_result(&mut self, result: &AnalysisResult) -> Result<(), SinkError> {
        let to_error = |source| SinkError::Write {
            destination: PathBuf::from(&self.name),
            source,
        };

        write_tokens(&mut self.writer, result).map_err(to_error)?;
        self.writer.flush().map_err(to_error)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn sample() -> AnalysisResult {
        AnalysisResult::from_unsorted(vec!["flex".to_string(), "bg-slate-950".to_string()])
    }

    #[test]
    fn test_line_format() {
        let mut buffer = Vec::new();
        write_tokens(&mut buffer, &sample()).unwrap();

        assert_eq!(String::from_utf8(buffer).unwrap(), "bg-slate-950\nflex\n");
    }

    #[test]
    fn test_empty_result_writes_empty_file() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("classes.txt");

        FileSink::new(&destination)
            .write_result(&AnalysisResult::default())
            .unwrap();

        assert_eq!(fs::read(&destination).unwrap(), b"");
    }

    #[test]
    fn test_previous_contents_replaced() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("classes.txt");
        fs::write(&destination, "stale\nlines\nthat-are-longer-than-the-new-output\n").unwrap();

        FileSink::new(&destination).write_result(&sample()).unwrap();

        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "bg-slate-950\nflex\n"
        );
        let leftovers = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_missing_directory_fails() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("no/such/dir/classes.txt");

        let err = FileSink::new(&destination)
            .write_result(&sample())
            .unwrap_err();

        assert_matches!(err, SinkError::Create { .. });
        assert!(!destination.exists());
    }

    #[test]
    fn test_directory_destination_fails_and_is_untouched() {
        let temp_dir = tempdir().unwrap();
        let destination = temp_dir.path().join("occupied");
        fs::create_dir(&destination).unwrap();

        let err = FileSink::new(&destination)
            .write_result(&sample())
            .unwrap_err();

        assert_matches!(err, SinkError::Write { .. });
        assert!(destination.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_destination_keeps_link() {
        let temp_dir = tempdir().unwrap();
        let target = temp_dir.path().join("target.txt");
        let link = temp_dir.path().join("classes.txt");
        fs::write(&target, "old\n").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        FileSink::new(&link).write_result(&sample()).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "bg-slate-950\nflex\n");
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_creates_target() {
        let temp_dir = tempdir().unwrap();
        let link = temp_dir.path().join("classes.txt");
        std::os::unix::fs::symlink("fresh.txt", &link).unwrap();

        FileSink::new(&link).write_result(&sample()).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("fresh.txt")).unwrap(),
            "bg-slate-950\nflex\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_read_only_directory_writes_in_place() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let locked = temp_dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        let destination = locked.join("classes.txt");
        fs::write(&destination, "stale\n").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users bypass directory permissions
        let check = locked.join("writable-check");
        if fs::write(&check, "").is_ok() {
            fs::remove_file(&check).unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let outcome = FileSink::new(&destination).write_result(&sample());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        outcome.unwrap();
        assert_eq!(
            fs::read_to_string(&destination).unwrap(),
            "bg-slate-950\nflex\n"
        );
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new(), "<memory>");
        sink.write_result(&sample()).unwrap();

        assert_eq!(sink.describe(), "<memory>");
        assert_eq!(sink.into_inner(), b"bg-slate-950\nflex\n");
    }
}
