use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// Destination for a domain's merged URLs: an append-mode file, optionally
/// mirrored to stdout.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: PathBuf,
    stream: bool,
}

impl OutputSink {
    pub fn new(path: impl Into<PathBuf>, stream: bool) -> Self {
        Self {
            path: path.into(),
            stream,
        }
    }

    /// Appends one URL per line, creating the file when it does not exist.
    pub fn write(&self, urls: &[String]) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open output file {:?}", self.path))?;

        let mut writer = BufWriter::new(file);
        write_lines(&mut writer, urls)
            .and_then(|_| writer.flush())
            .with_context(|| format!("Failed to write output file {:?}", self.path))?;

        if self.stream {
            let stdout = io::stdout();
            write_lines(&mut stdout.lock(), urls).context("Failed to stream URLs to stdout")?;
        }

        info!(action = "save", component = "output_sink", url_count = urls.len(), file_path = ?self.path, "Saved URLs");
        Ok(())
    }
}

pub fn write_lines<W: Write>(writer: &mut W, urls: &[String]) -> io::Result<()> {
    for url in urls {
        writeln!(writer, "{}", url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_lines_terminates_each_url() {
        let mut buf = Vec::new();
        write_lines(&mut buf, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_sink_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("example.com.txt");
        let sink = OutputSink::new(&path, false);

        sink.write(&["http://example.com/a?x=1".to_string()]).unwrap();
        sink.write(&["http://example.com/b".to_string()]).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "http://example.com/a?x=1\nhttp://example.com/b\n"
        );
    }

    #[test]
    fn test_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = OutputSink::new(dir.path().join("missing").join("out.txt"), false);
        assert!(sink.write(&["http://example.com/".to_string()]).is_err());
    }
}
