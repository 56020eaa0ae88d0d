use crate::engine::{global_logger, Enricher, EventLogger};
use crate::event::{LogEvent, PropertyFactory};
use crate::host::{LoggerProvider, State};
use crate::logger::BridgeLogger;
use crate::scope::{ProviderId, ScopeEnricher, ScopeGuard};
use std::sync::Arc;

/// Hands out [`BridgeLogger`]s and owns the scopes they open.
///
/// The provider registers a [`ScopeEnricher`] on the engine logger it
/// writes through, so every event picks up the properties of the scopes
/// open on the writing path.
pub struct BridgeLoggerProvider {
    id: ProviderId,
    enricher: ScopeEnricher,
    logger: Option<EventLogger>,
}

impl BridgeLoggerProvider {
    /// Provider writing through `logger`.
    pub fn new(logger: EventLogger) -> Self {
        let id = ProviderId::next();
        let enricher = ScopeEnricher::new(id);
        Self {
            id,
            enricher,
            logger: Some(logger.for_enricher(Arc::new(enricher))),
        }
    }

    /// Provider writing through whatever [`global_logger`] returns at the
    /// time each logger is created.
    pub fn from_global() -> Self {
        let id = ProviderId::next();
        Self {
            id,
            enricher: ScopeEnricher::new(id),
            logger: None,
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    /// Open a scope owned by this provider on the current path.
    pub fn begin_scope(&self, name: Option<&str>, state: impl Into<State>) -> ScopeGuard {
        ScopeGuard::push(self.id, name.map(str::to_string), state.into())
    }

    pub(crate) fn engine_logger(&self) -> EventLogger {
        match &self.logger {
            Some(logger) => logger.clone(),
            None => global_logger().for_enricher(Arc::new(self.enricher)),
        }
    }
}

impl LoggerProvider for BridgeLoggerProvider {
    type Logger = BridgeLogger;

    fn create_logger(&self, name: &str) -> BridgeLogger {
        BridgeLogger::new(self, name)
    }
}

impl Enricher for BridgeLoggerProvider {
    fn enrich(&self, event: &mut LogEvent, factory: &dyn PropertyFactory) {
        self.enricher.enrich(event, factory);
    }
}
