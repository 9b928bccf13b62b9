//! compose-emitter: context-binding methods over any event emitter
//!
//! Wraps an injected event emitter and produces *composed* methods. Listener
//! registrations (`on`, `once`, `off`) receive a merged execution context;
//! every other method is forwarded to the emitter unmodified.
//!
//! # Core Concepts
//!
//! - **Context**: a flat key/value mapping bound to listeners, merged one
//!   level deep with later layers winning
//! - **Composed method**: wraps one emitter method name
//! - **Emitter**: the caller-owned collaborator, driven through the [`Emitter`] trait
//!
//! # Example
//!
//! ```
//! use compose_emitter::{ComposeEmitter, ComposeOptions, Listener};
//! use serde_json::json;
//!
//! let options = ComposeOptions::new().with_context_value(json!({"foo": "bar"}));
//! let mut app = ComposeEmitter::new(options.with_emitter(compose_emitter::shared(
//!     compose_emitter::MemoryEmitter::new(),
//! )));
//!
//! app.compose("on")
//!     .unwrap()
//!     .listen("foo", Listener::new(|ctx, payload| {
//!         assert_eq!(ctx.get("foo"), Some(&json!("bar")));
//!         assert_eq!(payload, &[json!(123)]);
//!     }))
//!     .unwrap()
//!     .compose("emit")
//!     .unwrap()
//!     .emit("foo", [json!(123)])
//!     .unwrap();
//! ```

pub mod compose;
pub mod config;
pub mod context;
pub mod emitter;

pub use compose::{
    ComposeEmitter, ComposeError, ComposeResult, ComposedMethod, InvalidArgument, MethodKind,
    Registration,
};
pub use config::{ComposeOptions, ConfigError};
pub use context::{shallow_merge, AdapterId, Context, ListenerContext};
pub use emitter::{shared, Argument, Emitter, EmitterError, EmitterRef, Listener, MemoryEmitter};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
