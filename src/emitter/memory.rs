//! In-process reference emitter
//!
//! Stores listeners per event in registration order and dispatches them
//! synchronously. Understands two passthrough methods: `emit` and
//! `removeAllListeners`.

use super::{Argument, Emitter, EmitterError, Listener};
use crate::context::ListenerContext;
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

#[derive(Debug, Clone)]
struct Registration {
    listener: Listener,
    context: ListenerContext,
    once: bool,
}

/// A minimal synchronous event emitter.
///
/// Listeners run while the emitter is mutably borrowed, so a listener must
/// not call back into the same emitter.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    listeners: HashMap<String, Vec<Registration>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }

    /// Events that currently have at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.listeners.keys().cloned().collect();
        names.sort();
        names
    }

    /// Call every listener of `event` with `payload`.
    ///
    /// One-shot listeners are removed before any listener runs.
    /// Returns how many listeners were called.
    pub fn emit(&mut self, event: &str, payload: &[Value]) -> usize {
        let Some(registered) = self.listeners.get_mut(event) else {
            return 0;
        };

        let snapshot = registered.clone();
        registered.retain(|r| !r.once);
        if registered.is_empty() {
            self.listeners.remove(event);
        }

        trace!(event, listeners = snapshot.len(), "dispatching");
        for registration in &snapshot {
            registration.listener.call(&registration.context, payload);
        }
        snapshot.len()
    }

    fn add(&mut self, event: &str, listener: Listener, context: ListenerContext, once: bool) {
        self.listeners
            .entry(event.to_string())
            .or_default()
            .push(Registration {
                listener,
                context,
                once,
            });
    }

    fn remove(&mut self, event: Option<&str>, listener: Option<&Listener>) {
        let events: Vec<String> = match event {
            Some(event) => vec![event.to_string()],
            None => self.listeners.keys().cloned().collect(),
        };

        for event in events {
            let emptied = match self.listeners.get_mut(&event) {
                Some(registered) => {
                    match listener {
                        Some(listener) => registered.retain(|r| !r.listener.same_as(listener)),
                        None => registered.clear(),
                    }
                    registered.is_empty()
                }
                None => false,
            };
            if emptied {
                self.listeners.remove(&event);
            }
        }
    }
}

fn event_name(method: &str, arg: Option<&Argument>) -> Result<Option<String>, EmitterError> {
    match arg {
        None => Ok(None),
        Some(Argument::Value(Value::Null)) => Ok(None),
        Some(Argument::Value(Value::String(name))) => Ok(Some(name.clone())),
        Some(_) => Err(EmitterError::InvalidArguments {
            method: method.to_string(),
            reason: "event name must be a string".to_string(),
        }),
    }
}

impl Emitter for MemoryEmitter {
    fn register(
        &mut self,
        event: &str,
        listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError> {
        self.add(event, listener, context, false);
        Ok(())
    }

    fn register_once(
        &mut self,
        event: &str,
        listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError> {
        self.add(event, listener, context, true);
        Ok(())
    }

    fn unregister(
        &mut self,
        event: Option<&str>,
        listener: Option<&Listener>,
        _context: &ListenerContext,
    ) -> Result<(), EmitterError> {
        self.remove(event, listener);
        Ok(())
    }

    fn invoke(&mut self, method: &str, args: &[Argument]) -> Result<(), EmitterError> {
        match method {
            "emit" => {
                let event = event_name(method, args.first())?.ok_or_else(|| {
                    EmitterError::InvalidArguments {
                        method: method.to_string(),
                        reason: "missing event name".to_string(),
                    }
                })?;
                // Listeners are not JSON and cannot be part of a payload.
                let payload = args
                    .iter()
                    .skip(1)
                    .map(|arg| {
                        arg.as_value().cloned().ok_or_else(|| EmitterError::InvalidArguments {
                            method: method.to_string(),
                            reason: "payload must not contain listeners".to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                self.emit(&event, &payload);
                Ok(())
            }
            "removeAllListeners" => {
                let event = event_name(method, args.first())?;
                self.remove(event.as_deref(), None);
                Ok(())
            }
            other => Err(EmitterError::UnknownMethod(other.to_string())),
        }
    }
}
