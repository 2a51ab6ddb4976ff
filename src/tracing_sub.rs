use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::Level;

/// Where log lines go. The terminal demo owns the screen, so it logs to a
/// file or nowhere; library consumers usually want stderr.
#[derive(Clone, Debug)]
pub enum LogTarget {
    File(Arc<Mutex<File>>),
    Stderr,
    Sink,
}

impl LogTarget {
    pub fn file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::File(Arc::new(Mutex::new(file))))
    }
}

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<Mutex<File>>),
    Stderr(io::Stderr),
    Sink,
}

impl DelegatingWriter {
    fn new(target: &LogTarget) -> Self {
        let inner = match target {
            LogTarget::File(file) => DelegatingInner::File(file.clone()),
            LogTarget::Stderr => DelegatingInner::Stderr(io::stderr()),
            LogTarget::Sink => DelegatingInner::Sink,
        };
        DelegatingWriter { inner }
    }
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(file) => match file.lock() {
                Ok(mut f) => f.write(buf),
                Err(_) => Err(io::Error::other("log file lock poisoned")),
            },
            DelegatingInner::Stderr(s) => s.write(buf),
            DelegatingInner::Sink => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(file) => match file.lock() {
                Ok(mut f) => f.flush(),
                Err(_) => Err(io::Error::other("log file lock poisoned")),
            },
            DelegatingInner::Stderr(s) => s.flush(),
            DelegatingInner::Sink => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SubscriberMakeWriter {
    target: LogTarget,
}

impl SubscriberMakeWriter {
    pub fn new(target: LogTarget) -> Self {
        Self { target }
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DelegatingWriter::new(&self.target)
    }
}

/// Initialize the global subscriber writing to stderr. Safe to call multiple
/// times; later calls are no-ops.
pub fn init_default() {
    init_with(LogTarget::Stderr, Level::DEBUG);
}

pub fn init_with(target: LogTarget, level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(SubscriberMakeWriter::new(target))
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn file_target_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.log");
        let make = SubscriberMakeWriter::new(LogTarget::file(&path).unwrap());
        make.make_writer().write_all(b"first\n").unwrap();
        let mut writer = make.make_writer();
        writer.write_all(b"second\n").unwrap();
        writer.flush().unwrap();

        let mut contents = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[test]
    fn sink_swallows_everything() {
        let make = SubscriberMakeWriter::new(LogTarget::Sink);
        let mut writer = make.make_writer();
        assert_eq!(writer.write(b"dropped").unwrap(), 7);
        writer.flush().unwrap();
    }
}
