// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The session: bring-up, steady-state dispatch, and teardown.
//!
//! A session owns one reactor, the wakeup pipe, the timer wheel, and one
//! handler of each kind. Bring-up is strictly ordered: transport, reactor,
//! handlers, converter, channels, login exchange, directory, dictionary,
//! and finally the internal dispatch thread when the session runs in
//! api-dispatch mode. Teardown reverses it and is idempotent.

use std::sync::atomic::{AtomicBool, Ordering::SeqCst};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mio::Registry;
use parking_lot::Mutex;
use tracing::{debug, info};

use tl_config::{
    resolve, ActiveConfig, CallOverrides, ConfigStore, DispatchMode, SessionKind,
};
use tl_core::{
    Clock, ErrorCode, Handle, SessionError, SessionState, Severity, SystemClock, TimerWheel,
};
use tl_reactor::event::{JsonConversionError, MessageKind, OAuthCredential};
use tl_reactor::transport::{self, TransportOptions};
use tl_reactor::{
    ChannelInformation, ChannelStatistics, ConverterOptions, DirectoryRequest, LoginRequest,
    Reactor, ReactorError, ReactorOptions,
};

use crate::client::{ClientClosure, ErrorClient, OAuthClient, RestLogClient, SessionClient};
use crate::dispatch::{
    dispatch_flush, dispatch_loop, LoopResult, Poller, WakeFlag, REACTOR_TOKEN, WAKEUP_TOKEN,
};
use crate::handlers::{
    ChannelHandler, DictionaryHandler, DirectoryHandler, ItemHandler, LoginHandler, RestLogHandler,
};
use crate::logger::SessionLogger;
use crate::pipe::WakeupPipe;
use crate::registry;
use crate::request::{StreamDomain, StreamRequest};
use crate::router::route_error;

/// Factory producing the reactor at bring-up.
pub type ReactorFactory =
    Box<dyn FnOnce(&ReactorOptions) -> Result<Box<dyn Reactor>, ReactorError> + Send>;

/// Outcome of a user-driven dispatch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// At least one message reached a user callback.
    Dispatched,
    /// The timeout elapsed first.
    TimedOut,
}

/// The session logger, owned or injected.
pub(crate) enum Logger {
    Owned(SessionLogger),
    External(Arc<SessionLogger>),
}

impl Logger {
    pub fn as_ref(&self) -> &SessionLogger {
        match self {
            Logger::Owned(logger) => logger,
            Logger::External(logger) => logger,
        }
    }
}

/// State guarded by the user lock.
pub(crate) struct Core {
    pub state: SessionState,
    pub reactor: Option<Box<dyn Reactor>>,
    pub login: LoginHandler,
    pub directory: DirectoryHandler,
    pub dictionary: DictionaryHandler,
    pub items: ItemHandler,
    pub channels: ChannelHandler,
    pub rest_log: Option<RestLogHandler>,
    pub oauth_client: Option<Box<dyn OAuthClient>>,
    pub admin_closure: Option<ClientClosure>,
    /// Conversion errors parked by the sink for routing outside the lock.
    pub deferred_json_errors: Vec<JsonConversionError>,
}

/// Everything shared between the user thread and the dispatch thread.
pub(crate) struct SessionShared {
    pub instance_id: u64,
    pub config: ActiveConfig,
    pub kind: SessionKind,
    pub provider_session: bool,
    pub logger: Logger,
    pub clock: Arc<dyn Clock>,
    pub poll_registry: Registry,
    pub pipe: WakeupPipe,
    pub timers: TimerWheel,
    /// The user lock.
    pub core: Mutex<Core>,
    /// The dispatch lock, guarding the readiness set.
    pub dispatch: Mutex<Poller>,
    pub error_client: Option<Mutex<Box<dyn ErrorClient>>>,
    /// Credentials handed over during a renewal callback, submitted to the
    /// reactor once the user lock is released.
    pub pending_credentials: Mutex<Vec<OAuthCredential>>,
    pub api_thread: Mutex<Option<JoinHandle<()>>>,

    pub at_exit: AtomicBool,
    pub uninitialize_invoked: AtomicBool,
    pub event_received: AtomicBool,
    pub msg_dispatched: AtomicBool,
    pub login_timed_out: AtomicBool,
    pub in_oauth_callback: AtomicBool,
    pub api_thread_started: AtomicBool,
    pub stopping: AtomicBool,
}

/// Bring-up failure, tagged with whether the error router already ran.
enum BringUpError {
    /// Routed (and logged) by the dispatch loop; return as-is.
    Routed(SessionError),
    /// Not yet routed.
    Fresh(SessionError),
}

/// Builder for a [`Session`].
pub struct SessionBuilder {
    name: String,
    store: ConfigStore,
    overrides: CallOverrides,
    kind: SessionKind,
    dispatch_mode: Option<DispatchMode>,
    logger: Option<Arc<SessionLogger>>,
    clock: Arc<dyn Clock>,
    login_request: LoginRequest,
    directory_request: DirectoryRequest,
    admin_client: Option<Box<dyn SessionClient>>,
    admin_closure: Option<ClientClosure>,
    oauth_client: Option<Box<dyn OAuthClient>>,
    oauth_credential: Option<OAuthCredential>,
    rest_log_client: Option<Box<dyn RestLogClient>>,
    rest_log_closure: Option<ClientClosure>,
    error_client: Option<Box<dyn ErrorClient>>,
    reactor_factory: Option<ReactorFactory>,
}

impl SessionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            store: ConfigStore::new(),
            overrides: CallOverrides::default(),
            kind: SessionKind::Consumer,
            dispatch_mode: None,
            logger: None,
            clock: Arc::new(SystemClock),
            login_request: LoginRequest::default(),
            directory_request: DirectoryRequest::default(),
            admin_client: None,
            admin_closure: None,
            oauth_client: None,
            oauth_credential: None,
            rest_log_client: None,
            rest_log_closure: None,
            error_client: None,
            reactor_factory: None,
        }
    }

    pub fn config_store(mut self, store: ConfigStore) -> Self {
        self.store = store;
        self
    }

    pub fn overrides(mut self, overrides: CallOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn kind(mut self, kind: SessionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Override the config-driven dispatch mode.
    pub fn dispatch_mode(mut self, mode: DispatchMode) -> Self {
        self.dispatch_mode = Some(mode);
        self
    }

    /// Inject an external logger; the session will not own it.
    pub fn logger(mut self, logger: Arc<SessionLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn login_request(mut self, request: LoginRequest) -> Self {
        self.login_request = request;
        self
    }

    /// Pre-register a client against the session login stream.
    pub fn admin_client(
        mut self,
        client: Box<dyn SessionClient>,
        closure: Option<ClientClosure>,
    ) -> Self {
        self.admin_client = Some(client);
        self.admin_closure = closure;
        self
    }

    pub fn oauth(
        mut self,
        client: Box<dyn OAuthClient>,
        credential: OAuthCredential,
    ) -> Self {
        self.oauth_client = Some(client);
        self.oauth_credential = Some(credential);
        self
    }

    pub fn rest_log_client(
        mut self,
        client: Box<dyn RestLogClient>,
        closure: Option<ClientClosure>,
    ) -> Self {
        self.rest_log_client = Some(client);
        self.rest_log_closure = closure;
        self
    }

    /// Deliver errors through typed callbacks instead of `Err` returns.
    pub fn error_client(mut self, client: Box<dyn ErrorClient>) -> Self {
        self.error_client = Some(client);
        self
    }

    pub fn reactor_factory(
        mut self,
        factory: impl FnOnce(&ReactorOptions) -> Result<Box<dyn Reactor>, ReactorError>
            + Send
            + 'static,
    ) -> Self {
        self.reactor_factory = Some(Box::new(factory));
        self
    }

    /// Bring the session up. On failure the partially constructed session
    /// is torn down before the error is returned (and delivered to the
    /// error client, when one is registered).
    pub fn initialize(mut self) -> Result<Session, SessionError> {
        let Some(factory) = self.reactor_factory.take() else {
            return Err(SessionError::invalid_usage(
                "no reactor factory configured",
                ErrorCode::InvalidArgument,
            ));
        };
        let error_client = self.error_client.take().map(Mutex::new);

        let instance_id = registry::register();

        let resolved = match resolve(&self.store, &self.overrides, &self.name, instance_id) {
            Ok(resolved) => resolved,
            Err(error) => {
                registry::remove(instance_id);
                let quiet = SessionLogger::stdout(Severity::NoLogMsg);
                let _ = route_error(&quiet, &self.name, error_client.as_ref(), error.clone());
                return Err(error);
            }
        };
        let mut config = resolved.config;
        let mut messages = resolved.messages;
        if let Some(mode) = self.dispatch_mode {
            config.dispatch_mode = mode;
        }

        let logger = match self.logger.take() {
            Some(external) => Logger::External(external),
            None => match SessionLogger::from_config(&config.logger_config) {
                Ok(owned) => Logger::Owned(owned),
                Err(error) => {
                    registry::remove(instance_id);
                    let quiet = SessionLogger::stdout(Severity::NoLogMsg);
                    let _ = route_error(
                        &quiet,
                        &config.instance_name,
                        error_client.as_ref(),
                        error.clone(),
                    );
                    return Err(error);
                }
            },
        };

        // Flush warnings buffered during resolution, then the config trace.
        for message in messages.drain() {
            logger
                .as_ref()
                .log(&config.instance_name, message.severity, &message.text);
        }
        if logger.as_ref().enabled(Severity::Verbose) {
            logger.as_ref().log(
                &config.instance_name,
                Severity::Verbose,
                &format!("print out active configuration detail.{}", config.config_trace()),
            );
        }

        let poller = match Poller::new() {
            Ok(poller) => poller,
            Err(e) => {
                let error = SessionError::invalid_usage(
                    format!("failed to create the readiness set: {e}"),
                    ErrorCode::InternalError,
                );
                return Err(fail_no_shared(instance_id, &logger, &config, &error_client, error));
            }
        };
        let poll_registry = match poller.poll.registry().try_clone() {
            Ok(registry) => registry,
            Err(e) => {
                let error = SessionError::invalid_usage(
                    format!("failed to clone the readiness registry: {e}"),
                    ErrorCode::InternalError,
                );
                return Err(fail_no_shared(instance_id, &logger, &config, &error_client, error));
            }
        };

        let pipe = match WakeupPipe::new(&poll_registry, WAKEUP_TOKEN) {
            Ok(pipe) => pipe,
            Err(e) => {
                let error = SessionError::invalid_usage(
                    format!("Failed to create communication Pipe. ({e})"),
                    ErrorCode::InternalError,
                );
                return Err(fail_no_shared(instance_id, &logger, &config, &error_client, error));
            }
        };
        if logger.as_ref().enabled(Severity::Verbose) {
            logger.as_ref().log(
                &config.instance_name,
                Severity::Verbose,
                "Successfully initialized communication Pipe.",
            );
        }

        let core = Core {
            state: SessionState::NotInitialized,
            reactor: None,
            login: LoginHandler::new(self.login_request.clone()),
            directory: DirectoryHandler::new(
                self.directory_request.clone(),
                config.service_count_hint,
            ),
            dictionary: DictionaryHandler::new(),
            items: ItemHandler::new(config.item_count_hint),
            channels: ChannelHandler::new(),
            rest_log: self
                .rest_log_client
                .take()
                .map(|client| RestLogHandler::new(client, self.rest_log_closure.take())),
            oauth_client: self.oauth_client.take(),
            admin_closure: self.admin_closure.take(),
            deferred_json_errors: Vec::new(),
        };

        let provider_session = self.kind != SessionKind::Consumer;
        let shared = Arc::new(SessionShared {
            instance_id,
            config,
            kind: self.kind,
            provider_session,
            logger,
            clock: Arc::clone(&self.clock),
            poll_registry,
            pipe,
            timers: TimerWheel::new(),
            core: Mutex::new(core),
            dispatch: Mutex::new(poller),
            error_client,
            pending_credentials: Mutex::new(Vec::new()),
            api_thread: Mutex::new(None),
            at_exit: AtomicBool::new(false),
            uninitialize_invoked: AtomicBool::new(false),
            event_received: AtomicBool::new(false),
            msg_dispatched: AtomicBool::new(false),
            login_timed_out: AtomicBool::new(false),
            in_oauth_callback: AtomicBool::new(false),
            api_thread_started: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
        });

        // Admin client registration, ahead of the channel open.
        if let Some(client) = self.admin_client.take() {
            let mut core = shared.core.lock();
            let closure = core.admin_closure.clone();
            core.login.register(client, closure);
        }

        if let Err(error) = bring_up(&shared, factory, self.oauth_credential.take()) {
            uninitialize_impl(&shared, false, true);
            return match error {
                BringUpError::Routed(error) => Err(error),
                BringUpError::Fresh(error) => {
                    let _ = route_error(
                        shared.logger.as_ref(),
                        &shared.config.instance_name,
                        shared.error_client.as_ref(),
                        error.clone(),
                    );
                    Err(error)
                }
            };
        }

        if shared.config.dispatch_mode == DispatchMode::ApiDispatch
            && !shared.at_exit.load(SeqCst)
        {
            match spawn_api_thread(&shared) {
                Ok(handle) => {
                    *shared.api_thread.lock() = Some(handle);
                    while !shared.api_thread_started.load(SeqCst) {
                        thread::sleep(Duration::from_millis(100));
                    }
                }
                Err(e) => {
                    let error = SessionError::invalid_usage(
                        format!("failed to start the api dispatch thread: {e}"),
                        ErrorCode::InternalError,
                    );
                    uninitialize_impl(&shared, false, true);
                    let _ = route_error(
                        shared.logger.as_ref(),
                        &shared.config.instance_name,
                        shared.error_client.as_ref(),
                        error.clone(),
                    );
                    return Err(error);
                }
            }
        }

        if shared.at_exit.load(SeqCst) {
            let error = SessionError::invalid_usage(
                "application or user initiated exit while running initialize",
                ErrorCode::InvalidOperation,
            );
            uninitialize_impl(&shared, false, true);
            let _ = route_error(
                shared.logger.as_ref(),
                &shared.config.instance_name,
                shared.error_client.as_ref(),
                error.clone(),
            );
            return Err(error);
        }

        shared.core.lock().state.advance(SessionState::Operational);
        info!(instance = %shared.config.instance_name, "session initialized");
        Ok(Session { shared })
    }
}

/// The session runtime handle.
pub struct Session {
    shared: Arc<SessionShared>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_name", &self.shared.config.instance_name)
            .finish()
    }
}

impl Session {
    pub fn builder(name: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(name)
    }

    pub fn instance_name(&self) -> &str {
        &self.shared.config.instance_name
    }

    pub fn active_config(&self) -> &ActiveConfig {
        &self.shared.config
    }

    pub fn state(&self) -> SessionState {
        self.shared.core.lock().state
    }

    /// True while the OAuth renewal callback is on the stack.
    pub fn in_oauth_callback(&self) -> bool {
        self.shared.in_oauth_callback.load(SeqCst)
    }

    /// Whether the session login stream is open.
    pub fn login_granted(&self) -> bool {
        self.shared.core.lock().login.granted()
    }

    /// Numeric id of a directory service, when known.
    pub fn service_id(&self, name: &str) -> Option<u16> {
        self.shared.core.lock().directory.service_id(name)
    }

    /// Whether the initial directory refresh has arrived.
    pub fn directory_loaded(&self) -> bool {
        self.shared.core.lock().directory.is_loaded()
    }

    /// Whether the default dictionary is complete.
    pub fn dictionary_loaded(&self) -> bool {
        self.shared.core.lock().dictionary.is_loaded()
    }

    /// Number of open item streams.
    pub fn open_item_count(&self) -> usize {
        self.shared.core.lock().items.open_stream_count()
    }

    /// Drive the dispatch loop from the calling thread. Only valid in
    /// user-dispatch mode.
    pub fn dispatch(&self, timeout_us: i64) -> Result<DispatchResult, SessionError> {
        if self.shared.config.dispatch_mode == DispatchMode::ApiDispatch {
            let error = SessionError::invalid_usage(
                "dispatch() is not allowed while the api thread owns the loop",
                ErrorCode::InvalidOperation,
            );
            return self.route(Err(error)).map(|()| DispatchResult::TimedOut);
        }
        if self.shared.at_exit.load(SeqCst) {
            return self
                .route(Err(shutting_down()))
                .map(|()| DispatchResult::TimedOut);
        }

        let mut poller = self.shared.dispatch.lock();
        match dispatch_loop(
            &self.shared,
            &mut poller,
            timeout_us,
            self.shared.config.max_dispatch_count_user_thread,
            WakeFlag::MsgDispatched,
        ) {
            LoopResult::Dispatched => Ok(DispatchResult::Dispatched),
            LoopResult::TimedOut => Ok(DispatchResult::TimedOut),
            LoopResult::Fatal(Some(error)) => Err(error),
            LoopResult::Fatal(None) => Ok(DispatchResult::TimedOut),
        }
    }

    /// Register a client on a stream; returns the stream handle, or
    /// [`Handle::INVALID`] when the failure went to the error client.
    pub fn register_client(
        &self,
        request: &StreamRequest,
        client: Box<dyn SessionClient>,
        closure: Option<ClientClosure>,
        parent: Option<Handle>,
    ) -> Result<Handle, SessionError> {
        let result = (|| {
            self.guard_active()?;
            let mut core = self.shared.core.lock();
            match request.domain {
                StreamDomain::Login => Ok(core.login.register(client, closure)),
                _ => {
                    if let Some(service) = &request.service_name {
                        if core.directory.is_loaded()
                            && core.directory.service_id(service).is_none()
                        {
                            return Err(SessionError::invalid_usage(
                                format!("service name of [{service}] is not found"),
                                ErrorCode::InvalidArgument,
                            ));
                        }
                    }
                    let Core {
                        reactor,
                        items,
                        channels,
                        ..
                    } = &mut *core;
                    let reactor = reactor.as_mut().ok_or_else(no_reactor)?;
                    items.register(
                        reactor.as_mut(),
                        channels.active_channel(),
                        request,
                        client,
                        closure,
                        parent,
                    )
                }
            }
        })();
        match result {
            Ok(handle) => {
                self.shared.pipe.notify();
                Ok(handle)
            }
            Err(error) => {
                self.route(Err(error))?;
                Ok(Handle::INVALID)
            }
        }
    }

    /// Re-issue the request carried by an open stream.
    pub fn reissue(&self, request: &StreamRequest, handle: Handle) -> Result<(), SessionError> {
        let result = (|| {
            self.guard_active()?;
            let mut core = self.shared.core.lock();
            let Core {
                reactor,
                items,
                channels,
                ..
            } = &mut *core;
            let reactor = reactor.as_mut().ok_or_else(no_reactor)?;
            items.reissue(reactor.as_mut(), channels.active_channel(), request, handle)
        })();
        self.notify_and_route(result)
    }

    /// Close a stream and release its handle.
    pub fn unregister(&self, handle: Handle) -> Result<(), SessionError> {
        let result = (|| {
            self.guard_active()?;
            let mut core = self.shared.core.lock();
            if core.login.owns(handle) {
                core.login.unregister(handle);
                return Ok(());
            }
            let Core {
                reactor,
                items,
                channels,
                ..
            } = &mut *core;
            let reactor = reactor.as_mut().ok_or_else(no_reactor)?;
            items.unregister(reactor.as_mut(), channels.active_channel(), handle)
        })();
        self.notify_and_route(result)
    }

    /// Submit a generic message on an open stream.
    pub fn submit_generic(&self, payload: Vec<u8>, handle: Handle) -> Result<(), SessionError> {
        self.submit(MessageKind::Generic, payload, handle)
    }

    /// Submit a post message on an open stream.
    pub fn submit_post(&self, payload: Vec<u8>, handle: Handle) -> Result<(), SessionError> {
        self.submit(MessageKind::Post, payload, handle)
    }

    fn submit(
        &self,
        kind: MessageKind,
        payload: Vec<u8>,
        handle: Handle,
    ) -> Result<(), SessionError> {
        let result = (|| {
            self.guard_active()?;
            let mut core = self.shared.core.lock();
            let Core {
                reactor,
                items,
                channels,
                ..
            } = &mut *core;
            let reactor = reactor.as_mut().ok_or_else(no_reactor)?;
            items.submit(
                reactor.as_mut(),
                channels.active_channel(),
                kind,
                payload,
                handle,
            )
        })();
        self.notify_and_route(result)
    }

    /// Submit renewed OAuth credentials. Only valid from within the
    /// renewal callback; the in-callback marker makes the call re-entrant
    /// without touching the user lock.
    pub fn submit_oauth_credentials(
        &self,
        credential: OAuthCredential,
    ) -> Result<(), SessionError> {
        submit_credentials_impl(&self.shared, credential)
    }

    /// A cheap clonable port for submitting credentials from a renewal
    /// callback.
    pub fn credentials_port(&self) -> CredentialsPort {
        CredentialsPort {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Pass a runtime tuning code to the reactor.
    pub fn modify_ioctl(&self, code: i32, value: i32) -> Result<(), SessionError> {
        let result = (|| {
            self.guard_active()?;
            let mut core = self.shared.core.lock();
            let reactor = core.reactor.as_mut().ok_or_else(|| {
                SessionError::invalid_usage(
                    "no reactor to modify I/O option",
                    ErrorCode::InvalidArgument,
                )
            })?;
            reactor.ioctl(code, value).map_err(|e| {
                SessionError::invalid_usage(
                    format!("failed to modify I/O option for code = {code}: {e}"),
                    ErrorCode::ReactorFailure(e.code),
                )
            })
        })();
        self.route(result)
    }

    /// Static description of the active channel.
    pub fn channel_information(&self) -> Result<ChannelInformation, SessionError> {
        let result = (|| {
            let core = self.shared.core.lock();
            let channel = core.channels.active_channel().ok_or_else(no_channel)?;
            let reactor = core.reactor.as_ref().ok_or_else(no_reactor)?;
            reactor.channel_information(channel).map_err(|e| {
                SessionError::invalid_usage(e.to_string(), ErrorCode::ReactorFailure(e.code))
            })
        })();
        match result {
            Ok(info) => Ok(info),
            Err(error) => {
                self.route(Err(error))?;
                Ok(ChannelInformation::default())
            }
        }
    }

    /// Traffic counters for the active channel.
    pub fn channel_statistics(&self) -> Result<ChannelStatistics, SessionError> {
        let result = (|| {
            let core = self.shared.core.lock();
            let channel = core.channels.active_channel().ok_or_else(no_channel)?;
            let reactor = core.reactor.as_ref().ok_or_else(no_reactor)?;
            reactor.channel_statistics(channel).map_err(|e| {
                SessionError::invalid_usage(e.to_string(), ErrorCode::ReactorFailure(e.code))
            })
        })();
        match result {
            Ok(stats) => Ok(stats),
            Err(error) => {
                self.route(Err(error))?;
                Ok(ChannelStatistics::default())
            }
        }
    }

    /// Tear the session down. Idempotent; also performed on drop.
    pub fn uninitialize(&self) {
        uninitialize_impl(&self.shared, false, false);
    }

    fn guard_active(&self) -> Result<(), SessionError> {
        if self.shared.at_exit.load(SeqCst) {
            Err(shutting_down())
        } else {
            Ok(())
        }
    }

    fn route(&self, result: Result<(), SessionError>) -> Result<(), SessionError> {
        match result {
            Ok(()) => Ok(()),
            Err(error) => route_error(
                self.shared.logger.as_ref(),
                &self.shared.config.instance_name,
                self.shared.error_client.as_ref(),
                error,
            ),
        }
    }

    fn notify_and_route(&self, result: Result<(), SessionError>) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                self.shared.pipe.notify();
                Ok(())
            }
            Err(error) => self.route(Err(error)),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Drop may run on an unwinding path: skip the orderly login-close
        // flush and the quiesce step, as an abnormal teardown must.
        uninitialize_impl(&self.shared, true, false);
    }
}

/// Port for submitting renewed credentials from inside the renewal
/// callback without holding a `Session` reference.
#[derive(Clone)]
pub struct CredentialsPort {
    shared: Weak<SessionShared>,
}

impl CredentialsPort {
    pub fn submit(&self, credential: OAuthCredential) -> Result<(), SessionError> {
        let Some(shared) = self.shared.upgrade() else {
            return Err(SessionError::invalid_usage(
                "the session is gone",
                ErrorCode::InvalidOperation,
            ));
        };
        submit_credentials_impl(&shared, credential)
    }
}

/// Failure before the shared state exists: unregister, log, notify the
/// error client when present, and hand the error back.
fn fail_no_shared(
    instance_id: u64,
    logger: &Logger,
    config: &ActiveConfig,
    error_client: &Option<Mutex<Box<dyn ErrorClient>>>,
    error: SessionError,
) -> SessionError {
    registry::remove(instance_id);
    let _ = route_error(
        logger.as_ref(),
        &config.instance_name,
        error_client.as_ref(),
        error.clone(),
    );
    error
}

fn shutting_down() -> SessionError {
    SessionError::invalid_usage("the session is shutting down", ErrorCode::InvalidOperation)
}

fn no_reactor() -> SessionError {
    SessionError::invalid_usage("the session has no reactor", ErrorCode::InvalidOperation)
}

fn no_channel() -> SessionError {
    SessionError::invalid_usage("no active channel", ErrorCode::InvalidOperation)
}

fn none_if_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn submit_credentials_impl(
    shared: &SessionShared,
    credential: OAuthCredential,
) -> Result<(), SessionError> {
    if shared.in_oauth_callback.load(SeqCst) {
        shared.pending_credentials.lock().push(credential);
        Ok(())
    } else {
        route_error(
            shared.logger.as_ref(),
            &shared.config.instance_name,
            shared.error_client.as_ref(),
            SessionError::invalid_usage(
                "credential renewal may only be submitted during the renewal callback",
                ErrorCode::InvalidOperation,
            ),
        )
    }
}

fn reactor_options(config: &ActiveConfig, rest_logging_callback: bool) -> ReactorOptions {
    ReactorOptions {
        service_discovery_url: none_if_empty(&config.service_discovery_url),
        token_service_url_v1: none_if_empty(&config.token_service_url_v1),
        token_service_url_v2: none_if_empty(&config.token_service_url_v2),
        token_reissue_ratio: config.token_reissue_ratio,
        reissue_token_attempt_limit: config.reissue_token_attempt_limit,
        reissue_token_attempt_interval_ms: config.reissue_token_attempt_interval_ms,
        rest_request_timeout_ms: config.rest_request_timeout_ms,
        max_events_in_pool: config.max_events_in_pool,
        rest_enable_log: config.rest_enable_log,
        rest_log_file_name: none_if_empty(&config.rest_log_file_name),
        rest_logging_callback,
    }
}

fn log_verbose(shared: &SessionShared, text: &str) {
    if shared.logger.as_ref().enabled(Severity::Verbose) {
        shared
            .logger
            .as_ref()
            .log(&shared.config.instance_name, Severity::Verbose, text);
    }
}

/// Bring-up steps past pipe creation: transport, reactor, converter,
/// channels, the login exchange, directory, and dictionary.
fn bring_up(
    shared: &Arc<SessionShared>,
    factory: ReactorFactory,
    oauth_credential: Option<OAuthCredential>,
) -> Result<(), BringUpError> {
    let config = &shared.config;

    transport::initialize(&TransportOptions {
        global_and_channel_locking: true,
        lib_ssl_name: none_if_empty(&config.lib_ssl_name),
        lib_crypto_name: none_if_empty(&config.lib_crypto_name),
        lib_curl_name: none_if_empty(&config.lib_curl_name),
    })
    .map_err(|e| {
        BringUpError::Fresh(SessionError::invalid_usage(
            format!("transport initialization failed: {e}"),
            ErrorCode::InternalError,
        ))
    })?;
    shared
        .core
        .lock()
        .state
        .advance(SessionState::TransportInitialized);
    log_verbose(shared, "Successfully initialized transport.");

    let rest_logging_callback = shared.core.lock().rest_log.is_some();
    let options = reactor_options(config, rest_logging_callback);
    let mut reactor = factory(&options).map_err(|e| {
        BringUpError::Fresh(SessionError::invalid_usage(
            format!("failed to create the reactor: {e}"),
            ErrorCode::InternalError,
        ))
    })?;
    reactor
        .register_event_source(&shared.poll_registry, REACTOR_TOKEN)
        .map_err(|e| {
            BringUpError::Fresh(SessionError::invalid_usage(
                format!("failed to register the reactor event descriptor: {e}"),
                ErrorCode::InternalError,
            ))
        })?;
    shared
        .core
        .lock()
        .state
        .advance(SessionState::ReactorInitialized);
    log_verbose(shared, "Successfully created Reactor.");

    if shared.kind == SessionKind::Consumer {
        reactor
            .init_json_converter(&ConverterOptions {
                default_service_id: config.default_service_id_for_converter,
                json_expanded_enum_fields: config.json_expanded_enum_fields,
                catch_unknown_json_keys: config.catch_unknown_json_keys,
                catch_unknown_json_fids: config.catch_unknown_json_fids,
                close_channel_from_failure: config.close_channel_from_converter_failure,
                output_buffer_size: config.output_buffer_size,
            })
            .map_err(|e| {
                BringUpError::Fresh(SessionError::invalid_usage(
                    format!("failed to initialize the RWF/JSON converter: {e}"),
                    ErrorCode::InternalError,
                ))
            })?;
    }

    {
        let mut core = shared.core.lock();
        let login_request = core.login.login_request().clone();
        let directory_request = core.directory.directory_request().clone();
        core.channels
            .open_channels(
                reactor.as_mut(),
                config,
                &login_request,
                &directory_request,
                oauth_credential.as_ref(),
            )
            .map_err(BringUpError::Fresh)?;
        core.reactor = Some(reactor);
        core.state.advance(SessionState::LoginStreamOpenPending);
    }

    wait_for_login(shared)?;

    wait_for_admin(shared, "directory", ErrorCode::DirectoryRequestTimeout, |core| {
        core.directory.is_loaded()
    })?;
    wait_for_admin(shared, "dictionary", ErrorCode::DictionaryRequestTimeout, |core| {
        core.dictionary.is_loaded()
    })?;

    Ok(())
}

/// Spin the dispatch loop until the login stream opens, is rejected, the
/// watchdog fires, or the at-exit latch is set.
fn wait_for_login(shared: &Arc<SessionShared>) -> Result<(), BringUpError> {
    let timeout_ms = shared.config.login_request_timeout_ms;
    let watchdog = if timeout_ms > 0 {
        let weak = Arc::downgrade(shared);
        Some(shared.timers.schedule(
            shared.clock.now(),
            Duration::from_millis(u64::from(timeout_ms)),
            Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    shared.login_timed_out.store(true, SeqCst);
                }
            }),
        ))
    } else {
        None
    };

    let spin = (|| {
        let mut poller = shared.dispatch.lock();
        loop {
            let state = shared.core.lock().state;
            if state.login_open() || state == SessionState::LoginStreamRejected {
                return Ok(());
            }
            if shared.at_exit.load(SeqCst) || shared.login_timed_out.load(SeqCst) {
                return Ok(());
            }
            match dispatch_loop(
                shared,
                &mut poller,
                shared.config.dispatch_timeout_api_thread_us,
                shared.config.max_dispatch_count_api_thread,
                WakeFlag::EventReceived,
            ) {
                LoopResult::Fatal(Some(error)) => return Err(BringUpError::Routed(error)),
                LoopResult::Fatal(None) => {
                    return Err(BringUpError::Routed(SessionError::invalid_usage(
                        "reactor dispatch failed during initialization",
                        ErrorCode::InternalError,
                    )))
                }
                _ => {}
            }
        }
    })();
    if let Some(watchdog) = watchdog {
        shared.timers.cancel(watchdog);
    }
    spin?;

    if shared.at_exit.load(SeqCst) {
        return Err(BringUpError::Fresh(SessionError::invalid_usage(
            "application or user initiated exit while waiting for login response",
            ErrorCode::InvalidOperation,
        )));
    }

    let state = shared.core.lock().state;
    if state == SessionState::LoginStreamRejected {
        let text = shared
            .core
            .lock()
            .login
            .failure_text()
            .unwrap_or("login request rejected")
            .to_string();
        return Err(BringUpError::Fresh(SessionError::invalid_usage(
            text,
            ErrorCode::LoginRequestRejected,
        )));
    }

    if !state.login_open() && shared.login_timed_out.load(SeqCst) {
        shared
            .core
            .lock()
            .state
            .advance(SessionState::LoginTimedOut);
        let timeout_ms = shared.config.login_request_timeout_ms;
        let mut text = format!("login failed (timed out after waiting {timeout_ms} milliseconds)");
        if let Some(channel) = shared.config.channel_set.last() {
            if let Some(socket) = channel.socket_config() {
                text.push_str(&format!(" for {}:{}", socket.host, socket.service));
            }
        }
        return Err(BringUpError::Fresh(SessionError::invalid_usage(
            text,
            ErrorCode::LoginRequestTimeout,
        )));
    }

    debug!(instance = %shared.config.instance_name, "login stream open");
    Ok(())
}

/// Spin the dispatch loop until an admin domain (directory or dictionary)
/// is loaded, bounded by the request timeout.
fn wait_for_admin(
    shared: &Arc<SessionShared>,
    what: &str,
    code: ErrorCode,
    loaded: fn(&Core) -> bool,
) -> Result<(), BringUpError> {
    if shared.kind != SessionKind::Consumer {
        return Ok(());
    }
    if loaded(&shared.core.lock()) {
        return Ok(());
    }

    let timeout_ms = shared.config.request_timeout_ms;
    let timed_out = Arc::new(AtomicBool::new(false));
    let watchdog = if timeout_ms > 0 {
        let flag = Arc::clone(&timed_out);
        Some(shared.timers.schedule(
            shared.clock.now(),
            Duration::from_millis(u64::from(timeout_ms)),
            Box::new(move || flag.store(true, SeqCst)),
        ))
    } else {
        None
    };

    let result = (|| {
        let mut poller = shared.dispatch.lock();
        loop {
            if loaded(&shared.core.lock()) {
                return Ok(());
            }
            if shared.at_exit.load(SeqCst) {
                return Err(BringUpError::Fresh(SessionError::invalid_usage(
                    "application or user initiated exit during initialization",
                    ErrorCode::InvalidOperation,
                )));
            }
            if timed_out.load(SeqCst) {
                return Err(BringUpError::Fresh(SessionError::invalid_usage(
                    format!(
                        "{what} retrieval failed (timed out after waiting {timeout_ms} milliseconds)"
                    ),
                    code,
                )));
            }
            match dispatch_loop(
                shared,
                &mut poller,
                shared.config.dispatch_timeout_api_thread_us,
                shared.config.max_dispatch_count_api_thread,
                WakeFlag::EventReceived,
            ) {
                LoopResult::Fatal(Some(error)) => return Err(BringUpError::Routed(error)),
                LoopResult::Fatal(None) => {
                    return Err(BringUpError::Routed(SessionError::invalid_usage(
                        "reactor dispatch failed during initialization",
                        ErrorCode::InternalError,
                    )))
                }
                _ => {}
            }
        }
    })();
    if let Some(watchdog) = watchdog {
        shared.timers.cancel(watchdog);
    }
    result
}

fn spawn_api_thread(shared: &Arc<SessionShared>) -> std::io::Result<JoinHandle<()>> {
    let name = format!("{}-dispatch", shared.config.instance_name);
    let cloned = Arc::clone(shared);
    thread::Builder::new()
        .name(name)
        .spawn(move || api_dispatch_run(cloned))
}

/// Body of the internal dispatch thread. Holds the dispatch lock for its
/// whole run; teardown acquires that lock to know the loop has exited.
fn api_dispatch_run(shared: Arc<SessionShared>) {
    let mut poller = shared.dispatch.lock();
    shared.api_thread_started.store(true, SeqCst);

    while !shared.stopping.load(SeqCst) && !shared.at_exit.load(SeqCst) {
        let _ = dispatch_loop(
            &shared,
            &mut poller,
            shared.config.dispatch_timeout_api_thread_us,
            shared.config.max_dispatch_count_api_thread,
            WakeFlag::EventReceived,
        );
    }
    debug!(instance = %shared.config.instance_name, "api dispatch thread exiting");
}

/// Teardown. Idempotent; safe from the public API, from drop, and from the
/// bring-up failure path.
pub(crate) fn uninitialize_impl(
    shared: &Arc<SessionShared>,
    caught_exception: bool,
    called_from_init: bool,
) {
    let _cleanup = registry::acquire_cleanup();
    registry::remove(shared.instance_id);

    if shared.uninitialize_invoked.swap(true, SeqCst) {
        return;
    }

    shared.at_exit.store(true, SeqCst);
    shared.event_received.store(true, SeqCst);
    shared.msg_dispatched.store(true, SeqCst);
    shared.pipe.notify();

    if shared.config.dispatch_mode == DispatchMode::ApiDispatch {
        shared.stopping.store(true, SeqCst);
        let handle = shared.api_thread.lock().take();
        if let Some(handle) = handle {
            if !caught_exception && !called_from_init {
                // Quiesce: the thread holds the dispatch lock for its whole
                // run, so acquiring it means the loop has exited.
                let dispatch = shared.dispatch.lock();
                let user = shared.core.lock();
                drop(user);
                drop(dispatch);
            }
            let _ = handle.join();
        }
    }

    let mut core = shared.core.lock();
    if core.state == SessionState::NotInitialized {
        return;
    }

    // Let an orderly login close flush before the channels go away.
    if !caught_exception && core.reactor.is_some() {
        let channels = core.channels.channel_ids();
        let count = {
            let Core { reactor, login, .. } = &mut *core;
            match reactor.as_mut() {
                Some(reactor) => login.send_close(reactor.as_mut(), &channels),
                None => 0,
            }
        };
        if count > 0 {
            drop(core);
            dispatch_flush(shared, 10_000, count);
            core = shared.core.lock();
        }
    }

    if let Some(mut reactor) = core.reactor.take() {
        core.channels.close_all(reactor.as_mut(), &shared.poll_registry);
        let _ = reactor.deregister_event_source(&shared.poll_registry);
        drop(reactor);
        debug!(instance = %shared.config.instance_name, "reactor destroyed");
    }

    // Handlers go down in a fixed order: item, dictionary, directory,
    // login, channel.
    core.items.clear();
    core.dictionary.clear();
    core.directory.clear();
    core.login.clear();
    core.rest_log = None;
    core.oauth_client = None;

    let _ = transport::uninitialize();

    core.state.reset();
    drop(core);

    // The pipe lock is a leaf: never touched while the user lock is held.
    let _ = shared.pipe.deregister(&shared.poll_registry);
    info!(instance = %shared.config.instance_name, "session uninitialized");
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
