//! Composed methods
//!
//! A composed method wraps one emitter method name. Registration methods
//! (`on`, `once`, `off`) receive the merged listener context as their
//! trailing argument; every other method is forwarded verbatim.

use super::error::{ComposeError, ComposeResult, InvalidArgument};
use super::ComposeEmitter;
use crate::context::{shallow_merge, Context, ListenerContext};
use crate::emitter::{Argument, Emitter, EmitterError, Listener};
use serde_json::Value;
use tracing::debug;

/// The three reserved listener-registration operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Registration {
    /// Add a listener
    On,
    /// Add a one-shot listener
    Once,
    /// Remove listeners
    Off,
}

impl Registration {
    pub fn name(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Once => "once",
            Self::Off => "off",
        }
    }
}

/// How a composed method treats its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Merge and inject the listener context
    Registration(Registration),
    /// Forward every argument unmodified to the named method
    Passthrough(String),
}

impl MethodKind {
    /// Classify a method name. Only `on`, `once` and `off` are registrations.
    pub fn classify(method: &str) -> Self {
        match method {
            "on" => Self::Registration(Registration::On),
            "once" => Self::Registration(Registration::Once),
            "off" => Self::Registration(Registration::Off),
            other => Self::Passthrough(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Registration(registration) => registration.name(),
            Self::Passthrough(method) => method,
        }
    }

    pub fn is_registration(&self) -> bool {
        matches!(self, Self::Registration(_))
    }
}

impl std::fmt::Display for MethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Positional arguments of a registration call: `(event, listener, context)`.
#[derive(Debug, Default)]
struct RegistrationArgs {
    event: Option<String>,
    listener: Option<Listener>,
    context: Option<Context>,
}

impl RegistrationArgs {
    fn parse(args: &[Argument]) -> Result<Self, InvalidArgument> {
        let supplied = |i: usize| args.get(i).filter(|arg| !arg.is_null());

        let event = match supplied(0) {
            None => None,
            Some(Argument::Value(Value::String(name))) => Some(name.clone()),
            Some(_) => return Err(InvalidArgument::EventNameNotString),
        };
        let listener = match supplied(1) {
            None => None,
            Some(Argument::Listener(listener)) => Some(listener.clone()),
            Some(Argument::Value(_)) => return Err(InvalidArgument::MissingListener),
        };
        let context = match supplied(2) {
            None => None,
            Some(Argument::Value(Value::Object(map))) => Some(map.clone()),
            Some(_) => return Err(InvalidArgument::ContextNotObject),
        };

        Ok(Self {
            event,
            listener,
            context,
        })
    }

    /// Validate the arguments against what `registration` needs.
    ///
    /// `on` and `once` need both an event and a listener.
    fn into_target(self, registration: Registration) -> Result<Target, InvalidArgument> {
        match registration {
            Registration::On | Registration::Once => {
                let event = self.event.ok_or(InvalidArgument::MissingEventName)?;
                let listener = self.listener.ok_or(InvalidArgument::MissingListener)?;
                Ok(Target::Add {
                    event,
                    listener,
                    once: registration == Registration::Once,
                })
            }
            Registration::Off => Ok(Target::Remove {
                event: self.event,
                listener: self.listener,
            }),
        }
    }
}

/// A validated registration call.
#[derive(Debug)]
enum Target {
    Add {
        event: String,
        listener: Listener,
        once: bool,
    },
    Remove {
        event: Option<String>,
        listener: Option<Listener>,
    },
}

/// A method composed from an adapter by [`ComposeEmitter::compose`].
///
/// Each invocation recomputes the context merge against the adapter's
/// current configuration and returns the adapter for chaining.
pub struct ComposedMethod<'a> {
    adapter: &'a mut ComposeEmitter,
    kind: MethodKind,
}

impl<'a> ComposedMethod<'a> {
    pub(super) fn new(adapter: &'a mut ComposeEmitter, kind: MethodKind) -> Self {
        Self { adapter, kind }
    }

    pub fn kind(&self) -> &MethodKind {
        &self.kind
    }

    /// Invoke the method with positional arguments.
    ///
    /// Registration methods read `(event, listener, context)`; passthrough
    /// methods forward the whole list.
    pub fn call<I>(&mut self, args: I) -> ComposeResult<&mut ComposeEmitter>
    where
        I: IntoIterator<Item = Argument>,
    {
        let args: Vec<Argument> = args.into_iter().collect();
        let handle = self.adapter.bind_emitter()?;
        let mut emitter = handle
            .try_borrow_mut()
            .map_err(|_| EmitterError::Reentrant(self.kind.name().to_string()))?;

        match self.kind.clone() {
            MethodKind::Passthrough(method) => {
                debug!(
                    adapter = %self.adapter.id(),
                    method = %method,
                    args = args.len(),
                    "passthrough"
                );
                emitter.invoke(&method, &args)?;
            }
            MethodKind::Registration(registration) => {
                let mut parsed = RegistrationArgs::parse(&args)?;
                let call_context = parsed.context.take();
                let target = parsed.into_target(registration)?;
                let context = self.effective_context(call_context.as_ref());
                debug!(
                    adapter = %self.adapter.id(),
                    method = registration.name(),
                    fallback = context.is_adapter(),
                    "registration"
                );
                dispatch_registration(&mut *emitter, target, context)?;
            }
        }

        Ok(&mut *self.adapter)
    }

    /// Register `listener` for `event` with no call-time context.
    pub fn listen(&mut self, event: &str, listener: Listener) -> ComposeResult<&mut ComposeEmitter> {
        self.call([Argument::from(event), Argument::from(listener)])
    }

    /// Register `listener` for `event`, merging `context` over the adapter's context.
    pub fn listen_with(
        &mut self,
        event: &str,
        listener: Listener,
        context: Context,
    ) -> ComposeResult<&mut ComposeEmitter> {
        self.call([
            Argument::from(event),
            Argument::from(listener),
            Argument::Value(Value::Object(context)),
        ])
    }

    /// Call the method with an event name followed by a payload.
    pub fn emit<P>(&mut self, event: &str, payload: P) -> ComposeResult<&mut ComposeEmitter>
    where
        P: IntoIterator<Item = Value>,
    {
        let args = std::iter::once(Argument::from(event)).chain(payload.into_iter().map(Argument::Value));
        self.call(args)
    }

    /// Merge the call context over the stored one and persist the result.
    ///
    /// With no context anywhere, listeners run against the adapter itself.
    fn effective_context(&mut self, call_context: Option<&Context>) -> ListenerContext {
        match shallow_merge(self.adapter.context(), call_context) {
            Some(merged) => {
                self.adapter.persist_context(merged.clone());
                ListenerContext::Values(merged)
            }
            None => ListenerContext::Adapter(self.adapter.id().clone()),
        }
    }
}

fn dispatch_registration(
    emitter: &mut dyn Emitter,
    target: Target,
    context: ListenerContext,
) -> Result<(), ComposeError> {
    match target {
        Target::Add {
            event,
            listener,
            once: false,
        } => emitter.register(&event, listener, context)?,
        Target::Add {
            event,
            listener,
            once: true,
        } => emitter.register_once(&event, listener, context)?,
        Target::Remove { event, listener } => {
            emitter.unregister(event.as_deref(), listener.as_ref(), &context)?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn only_reserved_names_are_registrations() {
        assert_eq!(MethodKind::classify("on"), MethodKind::Registration(Registration::On));
        assert_eq!(MethodKind::classify("once"), MethodKind::Registration(Registration::Once));
        assert_eq!(MethodKind::classify("off"), MethodKind::Registration(Registration::Off));
        assert_eq!(MethodKind::classify("emit"), MethodKind::Passthrough("emit".to_string()));
        assert_eq!(MethodKind::classify("On"), MethodKind::Passthrough("On".to_string()));
    }

    #[test]
    fn kind_name_round_trips() {
        for name in ["on", "once", "off", "emit", "removeAllListeners"] {
            assert_eq!(MethodKind::classify(name).name(), name);
        }
    }

    #[test]
    fn parse_full_registration_args() {
        let listener = Listener::new(|_, _| {});
        let parsed = RegistrationArgs::parse(&[
            "foo".into(),
            listener.clone().into(),
            json!({"e": "f"}).into(),
        ])
        .unwrap();

        assert_eq!(parsed.event.as_deref(), Some("foo"));
        assert!(parsed.listener.unwrap().same_as(&listener));
        assert_eq!(parsed.context.map(Value::Object), Some(json!({"e": "f"})));
    }

    #[test]
    fn parse_treats_null_as_absent() {
        let parsed = RegistrationArgs::parse(&[Value::Null.into(), Value::Null.into()]).unwrap();
        assert!(parsed.event.is_none());
        assert!(parsed.listener.is_none());
        assert!(parsed.context.is_none());
    }

    #[test]
    fn parse_rejects_misplaced_values() {
        assert_eq!(
            RegistrationArgs::parse(&[json!(1).into()]).unwrap_err(),
            InvalidArgument::EventNameNotString
        );
        assert_eq!(
            RegistrationArgs::parse(&["foo".into(), json!("not a listener").into()]).unwrap_err(),
            InvalidArgument::MissingListener
        );
        assert_eq!(
            RegistrationArgs::parse(&[
                "foo".into(),
                Listener::new(|_, _| {}).into(),
                json!([1, 2]).into(),
            ])
            .unwrap_err(),
            InvalidArgument::ContextNotObject
        );
    }

    #[test]
    fn on_requires_event_and_listener() {
        let missing_event = RegistrationArgs::default();
        assert_eq!(
            missing_event.into_target(Registration::On).unwrap_err(),
            InvalidArgument::MissingEventName
        );

        let missing_listener = RegistrationArgs {
            event: Some("foo".to_string()),
            ..Default::default()
        };
        assert_eq!(
            missing_listener.into_target(Registration::Once).unwrap_err(),
            InvalidArgument::MissingListener
        );
    }

    #[test]
    fn off_accepts_missing_event_and_listener() {
        let target = RegistrationArgs::default().into_target(Registration::Off).unwrap();
        assert!(matches!(
            target,
            Target::Remove {
                event: None,
                listener: None
            }
        ));
    }
}
