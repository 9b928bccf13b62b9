//! The composing adapter
//!
//! `ComposeEmitter` wraps an injected emitter and hands out composed
//! methods. Registration methods receive a context built from three layers,
//! later layers winning per key:
//!
//! 1. the context given at construction,
//! 2. the context overlay given at composition time,
//! 3. the context given with the individual call.
//!
//! Each layer is persisted onto the adapter, so merging is cumulative across
//! calls. The emitter is bound lazily, on the first invocation of a composed
//! method, and stays bound for the adapter's lifetime.

mod error;
mod method;

pub use error::{ComposeError, ComposeResult, InvalidArgument};
pub use method::{ComposedMethod, MethodKind, Registration};

use crate::config::ComposeOptions;
use crate::context::{AdapterId, Context};
use crate::emitter::{shared, Argument, EmitterRef, Listener, MemoryEmitter};
use serde_json::Value;
use tracing::{debug, trace};

/// Adapter producing context-binding methods over an event emitter.
pub struct ComposeEmitter {
    id: AdapterId,
    options: ComposeOptions,
    /// Bumped on every replacement of `options`
    version: u64,
    /// Bound on first invocation of a composed method
    emitter: Option<EmitterRef>,
}

impl ComposeEmitter {
    /// Create an adapter. The emitter may be supplied now or in a later overlay.
    pub fn new(options: ComposeOptions) -> Self {
        Self {
            id: AdapterId::new(),
            options,
            version: 0,
            emitter: None,
        }
    }

    /// A ready-to-use adapter over a fresh [`MemoryEmitter`].
    pub fn standalone() -> Self {
        Self::new(ComposeOptions::new().with_emitter(shared(MemoryEmitter::new())))
    }

    pub fn id(&self) -> &AdapterId {
        &self.id
    }

    /// The adapter's current configuration.
    pub fn options(&self) -> &ComposeOptions {
        &self.options
    }

    /// The baseline context merged into every registration call.
    pub fn context(&self) -> Option<&Context> {
        self.options.context.as_ref()
    }

    /// Configuration version; starts at 0.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The bound emitter, if a composed method has been invoked.
    pub fn emitter(&self) -> Option<&EmitterRef> {
        self.emitter.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.emitter.is_some()
    }

    /// Compose a method for `method` using the current configuration.
    pub fn compose(&mut self, method: &str) -> ComposeResult<ComposedMethod<'_>> {
        self.compose_inner(method, None)
    }

    /// Compose a method, first overlaying `options` onto the adapter.
    ///
    /// The overlay persists: later compositions inherit it.
    pub fn compose_with(
        &mut self,
        method: &str,
        options: ComposeOptions,
    ) -> ComposeResult<ComposedMethod<'_>> {
        self.compose_inner(method, Some(options))
    }

    /// Compose from a dynamically typed method name.
    ///
    /// Fails with [`InvalidArgument::TypeNotString`] for anything but a string.
    pub fn compose_dynamic(
        &mut self,
        method: &Value,
        options: Option<ComposeOptions>,
    ) -> ComposeResult<ComposedMethod<'_>> {
        match method {
            Value::String(name) => self.compose_inner(name, options),
            _ => Err(InvalidArgument::TypeNotString.into()),
        }
    }

    fn compose_inner(
        &mut self,
        method: &str,
        options: Option<ComposeOptions>,
    ) -> ComposeResult<ComposedMethod<'_>> {
        if method.is_empty() {
            return Err(InvalidArgument::EmptyType.into());
        }

        if let Some(overlay) = options {
            let merged = self.options.overlay(&overlay);
            self.replace_options(merged);
        }

        let kind = MethodKind::classify(method);
        debug!(adapter = %self.id, method, version = self.version, "composed");
        Ok(ComposedMethod::new(self, kind))
    }

    /// Register `listener` for `event`.
    pub fn on(&mut self, event: &str, listener: Listener) -> ComposeResult<&mut Self> {
        self.compose("on")?.listen(event, listener)?;
        Ok(self)
    }

    /// Register `listener` for `event` with a call-time context.
    pub fn on_with(
        &mut self,
        event: &str,
        listener: Listener,
        context: Context,
    ) -> ComposeResult<&mut Self> {
        self.compose("on")?.listen_with(event, listener, context)?;
        Ok(self)
    }

    /// Register a one-shot `listener` for `event`.
    pub fn once(&mut self, event: &str, listener: Listener) -> ComposeResult<&mut Self> {
        self.compose("once")?.listen(event, listener)?;
        Ok(self)
    }

    /// Remove listeners. `None` widens the selection to every event or listener.
    pub fn off(&mut self, event: Option<&str>, listener: Option<Listener>) -> ComposeResult<&mut Self> {
        let event = event.map_or(Argument::Value(Value::Null), Argument::from);
        let listener = listener.map_or(Argument::Value(Value::Null), Argument::from);
        self.compose("off")?.call([event, listener])?;
        Ok(self)
    }

    /// Emit `event` with `payload` through the emitter's `emit` method.
    pub fn emit<P>(&mut self, event: &str, payload: P) -> ComposeResult<&mut Self>
    where
        P: IntoIterator<Item = Value>,
    {
        self.compose("emit")?.emit(event, payload)?;
        Ok(self)
    }

    fn replace_options(&mut self, options: ComposeOptions) {
        self.options = options;
        self.version += 1;
    }

    fn persist_context(&mut self, context: Context) {
        let options = ComposeOptions {
            context: Some(context),
            ..self.options.clone()
        };
        self.replace_options(options);
    }

    /// Resolve the configured emitter and attach it to the adapter.
    fn bind_emitter(&mut self) -> Result<EmitterRef, InvalidArgument> {
        if let Some(configured) = self.options.emitter.clone() {
            if self.emitter.is_none() {
                trace!(adapter = %self.id, "emitter bound");
            }
            self.emitter = Some(configured.clone());
            return Ok(configured);
        }
        if let Some(bound) = &self.emitter {
            return Ok(bound.clone());
        }

        match self.options.emitter_data() {
            Some(data) => Err(InvalidArgument::InvalidEmitter(format!(
                "expected an emitter object, found configuration value {data}"
            ))),
            None => Err(InvalidArgument::MissingEmitter),
        }
    }
}

impl Default for ComposeEmitter {
    fn default() -> Self {
        Self::new(ComposeOptions::default())
    }
}

impl std::fmt::Debug for ComposeEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeEmitter")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("version", &self.version)
            .field("bound", &self.is_bound())
            .finish()
    }
}
