//! Handler registry and invocation
//!
//! The registry maps each [`EventKind`] to at most one [`HandlerRef`]. A
//! handler reference is only a name; the [`HandlerHost`] resolves it when the
//! event fires, so nothing about the handler is checked at registration.
//!
//! Handlers may re-enter the bridge (register other handlers, change
//! selections) while they run. [`CallbackRegistry::callback`] therefore
//! copies the handler reference out of the table and releases every borrow
//! before the host is called.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use pkgbridge_errors::CallbackError;
use tracing::{debug, error, warn};

use crate::{
    BridgeEvent, CallbackEvent, EventEmitter, EventKind, EventSender, FailureContext, Value,
};

/// Opaque name of a host-side handler
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef(Rc<str>);

impl HandlerRef {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        Self(Rc::from(name))
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

/// Runs handlers on behalf of the bridge
///
/// Implemented by the embedding application (typically its script
/// interpreter). Signature mismatches are reported from here.
pub trait HandlerHost {
    /// Invoke `handler` with the positional `args` of an event of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler is unknown or fails to run.
    fn invoke(
        &self,
        handler: &HandlerRef,
        kind: EventKind,
        args: &[Value],
    ) -> Result<Value, CallbackError>;
}

type HostFn = Rc<dyn Fn(&[Value]) -> Result<Value, CallbackError>>;

/// Handler host backed by Rust closures
#[derive(Default)]
pub struct FnHost {
    handlers: RefCell<HashMap<String, HostFn>>,
}

impl FnHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or replace) the handler called `name`.
    pub fn define<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        self.handlers
            .borrow_mut()
            .insert(name.into(), Rc::new(move |args| Ok(handler(args))));
    }

    /// Define a handler that can fail.
    pub fn define_fallible<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&[Value]) -> Result<Value, CallbackError> + 'static,
    {
        self.handlers
            .borrow_mut()
            .insert(name.into(), Rc::new(handler));
    }

    pub fn undefine(&self, name: &str) {
        self.handlers.borrow_mut().remove(name);
    }
}

impl HandlerHost for FnHost {
    fn invoke(
        &self,
        handler: &HandlerRef,
        _kind: EventKind,
        args: &[Value],
    ) -> Result<Value, CallbackError> {
        let function = self
            .handlers
            .borrow()
            .get(handler.name())
            .cloned()
            .ok_or_else(|| CallbackError::UnknownHandler {
                handler: handler.name().to_string(),
            })?;
        function(args)
    }
}

/// Event kind to handler table
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    table: RefCell<HashMap<EventKind, HandlerRef>>,
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the handler for `kind`, replacing any previous one. An empty name
    /// unsets the kind.
    pub fn register(&self, kind: EventKind, handler: impl Into<HandlerRef>) {
        let handler = handler.into();
        if handler.name().is_empty() {
            self.unregister(kind);
            return;
        }
        debug!(kind = %kind, handler = %handler, "registering callback");
        self.table.borrow_mut().insert(kind, handler);
    }

    pub fn unregister(&self, kind: EventKind) -> Option<HandlerRef> {
        let previous = self.table.borrow_mut().remove(&kind);
        if previous.is_some() {
            debug!(kind = %kind, "unregistered callback");
        }
        previous
    }

    #[must_use]
    pub fn is_set(&self, kind: EventKind) -> bool {
        self.table.borrow().contains_key(&kind)
    }

    #[must_use]
    pub fn handler(&self, kind: EventKind) -> Option<HandlerRef> {
        self.table.borrow().get(&kind).cloned()
    }

    /// Kinds that currently have a handler
    #[must_use]
    pub fn registered(&self) -> Vec<EventKind> {
        let mut kinds: Vec<_> = self.table.borrow().keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn clear(&self) {
        self.table.borrow_mut().clear();
    }

    /// Prepare an invocation of the handler currently set for `kind`.
    #[must_use]
    pub fn callback(&self, kind: EventKind, host: Rc<dyn HandlerHost>) -> Callback {
        Callback {
            kind,
            handler: self.handler(kind),
            host,
            args: Vec::new(),
            events: None,
        }
    }
}

/// One pending handler invocation
pub struct Callback {
    kind: EventKind,
    handler: Option<HandlerRef>,
    host: Rc<dyn HandlerHost>,
    args: Vec<Value>,
    events: Option<EventSender>,
}

impl Callback {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    #[must_use]
    pub fn with_events(mut self, events: Option<EventSender>) -> Self {
        self.events = events;
        self
    }

    /// Append a positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Run the handler. An unset kind yields `Value::Void`.
    ///
    /// # Errors
    ///
    /// Returns the host's error when the handler cannot be run.
    pub fn invoke(&self) -> Result<Value, CallbackError> {
        let Some(handler) = &self.handler else {
            return Ok(Value::Void);
        };
        debug!(kind = %self.kind, handler = %handler, args = self.args.len(), "invoking callback");
        self.host.invoke(handler, self.kind, &self.args)
    }

    /// Run the handler for its side effects only.
    pub fn evaluate(&self) {
        let _ = self.reply();
    }

    /// Run the handler and expect a boolean, using `default` otherwise.
    #[must_use]
    pub fn evaluate_bool(&self, default: bool) -> bool {
        match self.reply() {
            Some(Value::Bool(value)) => value,
            Some(other) => {
                self.unexpected("boolean", &other);
                default
            }
            None => default,
        }
    }

    /// Run the handler and expect a string (or symbol) token.
    #[must_use]
    pub fn evaluate_string(&self) -> Option<String> {
        self.token("string")
    }

    /// Run the handler and expect a symbol (or string) token.
    #[must_use]
    pub fn evaluate_symbol(&self) -> Option<String> {
        self.token("symbol")
    }

    fn token(&self, expected: &str) -> Option<String> {
        match self.reply()? {
            Value::Str(token) | Value::Symbol(token) => Some(token),
            other => {
                self.unexpected(expected, &other);
                None
            }
        }
    }

    fn reply(&self) -> Option<Value> {
        let handler = self.handler.as_ref()?;
        match self.invoke() {
            Ok(value) => Some(value),
            Err(err) => {
                error!(kind = %self.kind, handler = %handler, error = %err, "callback failed");
                self.emit(BridgeEvent::Callback(CallbackEvent::Failed {
                    kind: self.kind,
                    handler: handler.name().to_string(),
                    failure: FailureContext::from_error(&err),
                }));
                None
            }
        }
    }

    fn unexpected(&self, expected: &str, found: &Value) {
        warn!(kind = %self.kind, expected, found = found.type_name(), "unexpected callback reply");
        self.emit(BridgeEvent::Callback(CallbackEvent::UnexpectedReply {
            kind: self.kind,
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }));
    }
}

impl EventEmitter for Callback {
    fn event_sender(&self) -> Option<&EventSender> {
        self.events.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn reregistering_replaces_handler() {
        let registry = CallbackRegistry::new();
        let host = Rc::new(FnHost::new());
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        {
            let first = Rc::clone(&first);
            host.define("first", move |_| {
                first.set(first.get() + 1);
                Value::Void
            });
        }
        {
            let second = Rc::clone(&second);
            host.define("second", move |_| {
                second.set(second.get() + 1);
                Value::Void
            });
        }

        registry.register(EventKind::Message, "first");
        registry.register(EventKind::Message, "second");
        registry.callback(EventKind::Message, host).evaluate();

        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn empty_name_unsets() {
        let registry = CallbackRegistry::new();
        registry.register(EventKind::StartDownload, "h");
        registry.register(EventKind::StartDownload, "");
        assert!(!registry.is_set(EventKind::StartDownload));
        assert!(registry.registered().is_empty());
    }

    #[test]
    fn wrong_reply_type_falls_back() {
        let registry = CallbackRegistry::new();
        let host = Rc::new(FnHost::new());
        host.define("h", |_| Value::from("yes"));
        registry.register(EventKind::AcceptUnsignedFile, "h");
        let accepted = registry
            .callback(EventKind::AcceptUnsignedFile, host)
            .arg("/tmp/file")
            .evaluate_bool(false);
        assert!(!accepted);
    }

    #[test]
    fn unknown_handler_reports_failure() {
        let registry = CallbackRegistry::new();
        let host: Rc<dyn HandlerHost> = Rc::new(FnHost::new());
        registry.register(EventKind::DonePackage, "missing");
        let (tx, mut rx) = crate::channel();
        let reply = registry
            .callback(EventKind::DonePackage, host)
            .with_events(Some(tx))
            .evaluate_string();
        assert!(reply.is_none());
        let message = rx.try_recv().unwrap();
        assert!(matches!(
            message.event,
            BridgeEvent::Callback(CallbackEvent::Failed { .. })
        ));
    }

    #[test]
    fn handler_may_reregister_while_running() {
        let registry = Rc::new(CallbackRegistry::new());
        let host = Rc::new(FnHost::new());
        {
            let registry = Rc::clone(&registry);
            host.define("swap", move |_| {
                registry.register(EventKind::Message, "other");
                Value::Bool(true)
            });
        }
        registry.register(EventKind::Message, "swap");
        assert!(registry
            .callback(EventKind::Message, host)
            .evaluate_bool(false));
        assert_eq!(registry.handler(EventKind::Message).unwrap().name(), "other");
    }
}
