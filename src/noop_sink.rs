use crate::event::LogEvent;
use crate::sink::EventSink;
use std::error::Error;

/// A sink that simply drops all events.
///
/// Backs the process-wide default logger until one is installed, and is
/// handy for measuring the overhead of the translation path on its own.
#[derive(Clone, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}
