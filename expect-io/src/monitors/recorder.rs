use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, PoisonError},
};

use crate::{Event, Subscriber};

/// A subscriber that records events to a file in JSON Lines format.
///
/// Each event is written as a JSON object on its own line, making the output
/// easy to diff between test runs. Lines are flushed immediately.
///
/// # Example
///
/// ```ignore
/// let recorder = Recorder::new("io.jsonl")?;
/// let _recording = bus.subscribe_scoped(Subscribe::all(), recorder);
/// ```
#[derive(Debug)]
pub struct Recorder {
    writer: Mutex<BufWriter<File>>,
}

impl Recorder {
    /// Create a new recorder that writes to the specified path.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] if the file cannot be created.
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

impl Subscriber for Recorder {
    fn on_event(&self, event: &Event) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = serde_json::to_writer(&mut *writer, event) {
            tracing::warn!("Recorder failed to serialize event: {}", e);
            return;
        }
        let _ = writer.write_all(b"\n");
        let _ = writer.flush();
    }
}
