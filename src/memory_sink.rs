use crate::event::LogEvent;
use crate::sink::EventSink;
use std::error::Error;
use std::sync::{Mutex, MutexGuard};

/// Keeps every emitted event in memory, in write order.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Snapshot of the events written so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything written so far.
    pub fn drain(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.lock())
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.lock().push(event.clone());
        Ok(())
    }
}
