//! Emitter capability interface
//!
//! The adapter never stores or dispatches listeners itself. It talks to an
//! injected emitter through the four operations of [`Emitter`]: three
//! registration operations that receive the merged listener context, and an
//! open `invoke` escape hatch for everything else (typically emission).

pub mod memory;

use crate::context::ListenerContext;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

pub use memory::MemoryEmitter;

/// Shared handle to a caller-owned emitter.
///
/// The adapter references the emitter; it never constructs one.
pub type EmitterRef = Rc<RefCell<dyn Emitter>>;

/// Wrap a concrete emitter into a shareable [`EmitterRef`].
pub fn shared<E: Emitter + 'static>(emitter: E) -> EmitterRef {
    Rc::new(RefCell::new(emitter))
}

/// Errors raised by an emitter implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmitterError {
    #[error("emitter has no method named `{0}`")]
    UnknownMethod(String),
    #[error("invalid arguments for `{method}`: {reason}")]
    InvalidArguments { method: String, reason: String },
    /// The emitter was called again while one of its listeners was running
    #[error("emitter is busy; `{0}` was called from inside a listener")]
    Reentrant(String),
}

/// A listener callback.
///
/// Receives the context it was registered with and the emitted payload.
/// Identity (for removal) is pointer identity of the shared callback.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&ListenerContext, &[Value])>);

impl Listener {
    pub fn new(f: impl Fn(&ListenerContext, &[Value]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Run the callback.
    pub fn call(&self, context: &ListenerContext, payload: &[Value]) {
        (self.0)(context, payload)
    }

    /// True if both handles refer to the same callback.
    pub fn same_as(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Listener({:p})", Rc::as_ptr(&self.0))
    }
}

/// A single positional argument of a composed-method call.
#[derive(Debug, Clone)]
pub enum Argument {
    Value(Value),
    Listener(Listener),
}

impl Argument {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Listener(_) => None,
        }
    }

    pub fn as_listener(&self) -> Option<&Listener> {
        match self {
            Self::Listener(l) => Some(l),
            Self::Value(_) => None,
        }
    }

    /// `null` stands for an argument that was not supplied.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Value(Value::Null))
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<Listener> for Argument {
    fn from(listener: Listener) -> Self {
        Self::Listener(listener)
    }
}

/// The operations an emitter must support to be driven by the adapter.
pub trait Emitter {
    /// Add a listener for `event` ("on").
    fn register(
        &mut self,
        event: &str,
        listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError>;

    /// Add a listener that fires at most once ("once").
    fn register_once(
        &mut self,
        event: &str,
        listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError>;

    /// Remove listeners ("off").
    ///
    /// `None` for `event` means every event; `None` for `listener` means
    /// every listener of the selected events.
    fn unregister(
        &mut self,
        event: Option<&str>,
        listener: Option<&Listener>,
        context: &ListenerContext,
    ) -> Result<(), EmitterError>;

    /// Call any other method by name with the arguments exactly as received.
    fn invoke(&mut self, method: &str, args: &[Argument]) -> Result<(), EmitterError>;
}
