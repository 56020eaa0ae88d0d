use crate::event::LogEvent;
use std::error::Error;
use std::sync::Arc;

/// Destination for [`LogEvent`]s written by an [`crate::engine::EventLogger`].
///
/// Implementations own transport and formatting; the bridge only hands
/// them finished events. `emit` is called synchronously on the logging
/// thread, so anything slow should be queued internally.
pub trait EventSink: Send + Sync {
    /// Accept a single event.
    ///
    /// **Returns**
    /// - `Ok(())` if the event was accepted.
    /// - `Err(..)` if the sink failed. The logger reports the failure on
    ///   its self-diagnostic channel and carries on; the caller never sees it.
    fn emit(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Flush any buffered events. Default implementation is a no-op.
    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(())
    }
}

/// Writes every event to each inner sink in order.
///
/// A failing sink does not stop the others; the first error is returned
/// after all sinks have been tried.
#[derive(Clone, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for FanoutSink {
    fn emit(&self, event: &LogEvent) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event) {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn flush(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut first_err = None;
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
