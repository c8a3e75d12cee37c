//! In-memory debug log ring buffer, and the tracing subscriber that feeds
//! it.
//!
//! Log output cannot go to stderr while the alternate screen is active
//! without corrupting the terminal, so the subscriber writes into a ring
//! buffer the shell shows in a toggleable overlay. Before the global handle
//! is installed, writes fall back to stderr.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;

const MAX_LINES: usize = 500;

static GLOBAL: OnceLock<DebugLogHandle> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct DebugLogHandle {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl DebugLogHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: &str) {
        let Ok(mut lines) = self.lines.lock() else {
            return;
        };
        if lines.len() == MAX_LINES {
            lines.pop_front();
        }
        lines.push_back(line.to_string());
    }

    /// Most recent `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(lines) = self.lines.lock() else {
            return Vec::new();
        };
        lines
            .iter()
            .skip(lines.len().saturating_sub(count))
            .cloned()
            .collect()
    }

    pub fn writer(&self) -> DebugLogWriter {
        DebugLogWriter {
            handle: self.clone(),
            buf: Vec::new(),
        }
    }
}

/// Install the global handle; returns the existing one when already set.
pub fn install_global() -> DebugLogHandle {
    GLOBAL.get_or_init(DebugLogHandle::new).clone()
}

pub fn global() -> Option<DebugLogHandle> {
    GLOBAL.get().cloned()
}

/// Line-buffering writer that feeds the ring buffer.
pub struct DebugLogWriter {
    handle: DebugLogHandle,
    buf: Vec<u8>,
}

impl Write for DebugLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line);
            self.handle.push_line(text.trim_end());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let text = String::from_utf8_lossy(&self.buf).to_string();
            self.handle.push_line(text.trim_end());
            self.buf.clear();
        }
        Ok(())
    }
}

impl Drop for DebugLogWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Writer handed to the subscriber per event: the ring buffer once the
/// global handle exists, stderr otherwise.
pub enum RingWriter {
    Ring(DebugLogWriter),
    Stderr(io::Stderr),
}

impl Write for RingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Ring(writer) => writer.write(buf),
            Self::Stderr(stderr) => stderr.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Ring(writer) => writer.flush(),
            Self::Stderr(stderr) => stderr.flush(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RingMakeWriter;

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RingMakeWriter {
    type Writer = RingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        match global() {
            Some(handle) => RingWriter::Ring(handle.writer()),
            None => RingWriter::Stderr(io::stderr()),
        }
    }
}

/// Install the tracing subscriber writing into the ring buffer. Safe to call
/// more than once; later calls are no-ops for the global subscriber.
pub fn init_tracing(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_writer(RingMakeWriter)
        .with_target(false)
        .with_thread_names(false)
        .with_ansi(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_splits_lines() {
        let handle = DebugLogHandle::new();
        let mut writer = handle.writer();
        writer.write_all(b"first\nsec").unwrap();
        writer.write_all(b"ond\n").unwrap();
        assert_eq!(handle.tail(10), vec!["first", "second"]);
    }

    #[test]
    fn ring_buffer_drops_oldest() {
        let handle = DebugLogHandle::new();
        for i in 0..(MAX_LINES + 5) {
            handle.push_line(&format!("line {i}"));
        }
        let tail = handle.tail(MAX_LINES + 10);
        assert_eq!(tail.len(), MAX_LINES);
        assert_eq!(tail[0], "line 5");
    }
}
