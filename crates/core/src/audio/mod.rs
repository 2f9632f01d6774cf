use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Result, VisualiserError};

/// Data a capture provider delivered for one frame. Either kind may be
/// missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedFrame {
    /// Monotonic frame counter assigned by the provider.
    pub sequence: u64,
    /// Unsigned 8-bit time-domain samples.
    pub waveform: Option<Vec<u8>>,
    /// Interleaved signed 8-bit real/imaginary FFT pairs.
    pub fft: Option<Vec<i8>>,
}

/// Latest-frame-wins slot shared by one capture thread and one render thread.
#[derive(Debug, Default)]
struct Slot {
    frame: Option<CapturedFrame>,
    overwritten: u64,
    closed: bool,
}

/// Creates a connected writer/reader pair.
///
/// Neither half is `Clone`, so there is exactly one producer and one
/// consumer. A frame published before the previous one was taken replaces
/// it.
pub fn snapshot_handoff() -> (SnapshotWriter, SnapshotReader) {
    let shared = Arc::new(Mutex::new(Slot::default()));
    (
        SnapshotWriter {
            shared: shared.clone(),
        },
        SnapshotReader { shared },
    )
}

/// Producer half of the handoff, owned by the capture side.
#[derive(Debug)]
pub struct SnapshotWriter {
    shared: Arc<Mutex<Slot>>,
}

impl SnapshotWriter {
    /// Publishes `frame`, replacing any frame the reader has not taken yet.
    pub fn publish(&self, frame: CapturedFrame) -> Result<()> {
        let mut slot = lock(&self.shared)?;
        if slot.frame.replace(frame).is_some() {
            slot.overwritten += 1;
        }
        Ok(())
    }

    /// Marks the stream as finished. Dropping the writer has the same effect.
    pub fn close(self) {}
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.lock() {
            slot.closed = true;
        }
    }
}

/// Consumer half of the handoff, owned by the render side.
#[derive(Debug)]
pub struct SnapshotReader {
    shared: Arc<Mutex<Slot>>,
}

impl SnapshotReader {
    /// Takes the most recent unread frame, if any.
    pub fn take_latest(&self) -> Result<Option<CapturedFrame>> {
        let mut slot = lock(&self.shared)?;
        Ok(slot.frame.take())
    }

    /// Returns `true` once the writer is gone and the last frame was taken.
    pub fn is_finished(&self) -> Result<bool> {
        let slot = lock(&self.shared)?;
        Ok(slot.closed && slot.frame.is_none())
    }

    /// Number of frames replaced before the reader got to them.
    pub fn overwritten(&self) -> Result<u64> {
        let slot = lock(&self.shared)?;
        Ok(slot.overwritten)
    }
}

fn lock(shared: &Mutex<Slot>) -> Result<MutexGuard<'_, Slot>> {
    shared
        .lock()
        .map_err(|_| VisualiserError::msg("snapshot handoff has been poisoned"))
}
