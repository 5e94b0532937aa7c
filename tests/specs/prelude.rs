//! Shared helpers for the behavioral specs.

use std::sync::Arc;

use tl_config::DispatchMode;
use tl_core::Severity;
use tl_reactor::stub::StubReactor;
use tl_reactor::Reactor;
use tl_session::{SessionBuilder, SessionLogger};

/// A logger that swallows everything, keeping spec output clean.
pub fn quiet_logger() -> Arc<SessionLogger> {
    Arc::new(SessionLogger::stdout(Severity::NoLogMsg))
}

/// A user-dispatch builder wired to `stub`.
pub fn builder_with(name: &str, stub: StubReactor) -> SessionBuilder {
    SessionBuilder::new(name)
        .dispatch_mode(DispatchMode::UserDispatch)
        .logger(quiet_logger())
        .reactor_factory(move |_options| Ok(Box::new(stub) as Box<dyn Reactor>))
}
