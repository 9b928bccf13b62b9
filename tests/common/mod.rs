//! Shared helpers for the compose-emitter integration tests

use compose_emitter::{Argument, Context, Emitter, EmitterError, Listener, ListenerContext};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Install a fmt subscriber writing through the test harness.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

/// Build a context from a JSON object literal.
pub fn ctx(value: Value) -> Context {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

/// A call observed by a [`RecordingEmitter`].
#[derive(Debug, Clone)]
pub enum Recorded {
    Register {
        event: String,
        once: bool,
        context: ListenerContext,
    },
    Unregister {
        event: Option<String>,
        had_listener: bool,
    },
    Invoke {
        method: String,
        args: Vec<Argument>,
    },
}

/// Emitter that records every call and dispatches nothing.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    pub calls: Vec<Recorded>,
}

impl Emitter for RecordingEmitter {
    fn register(
        &mut self,
        event: &str,
        _listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError> {
        self.calls.push(Recorded::Register {
            event: event.to_string(),
            once: false,
            context,
        });
        Ok(())
    }

    fn register_once(
        &mut self,
        event: &str,
        _listener: Listener,
        context: ListenerContext,
    ) -> Result<(), EmitterError> {
        self.calls.push(Recorded::Register {
            event: event.to_string(),
            once: true,
            context,
        });
        Ok(())
    }

    fn unregister(
        &mut self,
        event: Option<&str>,
        listener: Option<&Listener>,
        _context: &ListenerContext,
    ) -> Result<(), EmitterError> {
        self.calls.push(Recorded::Unregister {
            event: event.map(str::to_string),
            had_listener: listener.is_some(),
        });
        Ok(())
    }

    fn invoke(&mut self, method: &str, args: &[Argument]) -> Result<(), EmitterError> {
        self.calls.push(Recorded::Invoke {
            method: method.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }
}

/// Calls captured by [`capture`]: the bound context and payload of each.
pub type Captured = Rc<RefCell<Vec<(ListenerContext, Vec<Value>)>>>;

/// A listener that records every invocation.
pub fn capture() -> (Listener, Captured) {
    let calls: Captured = Rc::new(RefCell::new(Vec::new()));
    let calls_in = calls.clone();
    let listener = Listener::new(move |context, payload| {
        calls_in
            .borrow_mut()
            .push((context.clone(), payload.to_vec()));
    });
    (listener, calls)
}
