//! Error instances: construction and the push protocol
//!
//! Construction renders every spec field, parses the arguments, captures a
//! stack, registers the type's hooks on a private per-instance channel and
//! fires `constructed` hooks (now, or on the next deferred turn when the type
//! sets `asyncConstruct`). The initial values are then replayed through the
//! push channel on the deferred turn, so listeners attached right after
//! construction still observe every value.
//!
//! Instances are single-threaded handles: cloning shares the same instance.

use core::fmt;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use backtrace::{Backtrace, BacktraceFrame};
use indexmap::IndexMap;

use crate::args;
use crate::error::{LineageError, Result};
use crate::error_type::ErrorType;
use crate::hooks::{ConstructedHook, HookEvent};
use crate::schedule;
use crate::spec::{self, keys};
use crate::template;
use crate::transport;
use crate::value::Value;

/// Per-instance `push` listener
pub type PushListener = Rc<dyn Fn(&ErrorInstance, &Value)>;

/// An instance of an [`ErrorType`]
#[derive(Clone)]
pub struct ErrorInstance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    error_type: ErrorType,
    fields: IndexMap<String, Value>,
    values: RefCell<Vec<Value>>,
    stack: Option<Backtrace>,
    serialize_stack: bool,
    async_construct: bool,
    channel: Channel,
}

/// Private event channel of one instance
struct Channel {
    constructed: Vec<ConstructedHook>,
    push: RefCell<Vec<PushListener>>,
    replay: Cell<Replay>,
}

/// Bound on deferred re-delivery of the initial values
#[derive(Debug, Clone, Copy)]
struct Replay {
    bound: usize,
    delivered: usize,
}

impl ErrorInstance {
    pub(crate) fn construct<I>(error_type: ErrorType, raw_args: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        let spec = error_type.spec();
        let mut fields: IndexMap<String, Value> = spec
            .iter()
            .map(|(key, raw)| (key.clone(), Value::from(template::render(raw, spec))))
            .collect();

        let parsed = args::parse(raw_args);
        if !parsed.message.is_empty() {
            fields.insert(keys::MESSAGE.to_owned(), Value::String(parsed.message));
        }

        let flag = |key: &str| fields.get(key).is_some_and(Value::is_truthy);
        let omit_stack = flag(keys::OMIT_STACK);
        let serialize_stack = flag(keys::SERIALIZE_STACK);
        let async_construct = flag(keys::ASYNC_CONSTRUCT);

        let stack = (!omit_stack).then(capture_stack);

        let hooks = error_type.hooks();
        let push = hooks
            .push()
            .iter()
            .map(|hook| {
                let hook = Arc::clone(hook);
                Rc::new(move |instance: &ErrorInstance, value: &Value| hook(instance, value)) as PushListener
            })
            .collect();
        let channel = Channel {
            constructed: hooks.constructed().to_vec(),
            push: RefCell::new(push),
            replay: Cell::new(Replay {
                bound: parsed.values.len(),
                delivered: 0,
            }),
        };

        let instance = Self {
            inner: Rc::new(InstanceInner {
                error_type,
                fields,
                values: RefCell::new(parsed.values),
                stack,
                serialize_stack,
                async_construct,
                channel,
            }),
        };

        tracing::trace!(
            name = %instance.name(),
            values = instance.value_count(),
            async_construct,
            stack = instance.has_stack(),
            "constructed error instance"
        );

        if !async_construct {
            instance.dispatch_constructed();
        }

        // Nothing to replay and no deferred hooks: skip the turn.
        if async_construct || instance.inner.channel.replay.get().bound > 0 {
            let deferred = instance.clone();
            schedule::defer(move || deferred.run_deferred_turn());
        }

        instance
    }

    fn dispatch_constructed(&self) {
        for hook in &self.inner.channel.constructed {
            hook(self);
        }
    }

    fn run_deferred_turn(&self) {
        if self.inner.async_construct {
            tracing::trace!(name = %self.name(), "deferred constructed hooks");
            self.dispatch_constructed();
        }

        let bound = self.inner.channel.replay.get().bound;
        let initial: Vec<Value> = self.inner.values.borrow().iter().take(bound).cloned().collect();
        for value in &initial {
            self.replay(value);
        }
    }

    fn replay(&self, value: &Value) {
        let mut replay = self.inner.channel.replay.get();
        if replay.delivered >= replay.bound {
            tracing::debug!(
                name = %self.name(),
                bound = replay.bound,
                "replay notification suppressed"
            );
            return;
        }
        replay.delivered += 1;
        self.inner.channel.replay.set(replay);
        self.notify_push(value);
    }

    fn notify_push(&self, value: &Value) {
        let listeners = self.inner.channel.push.borrow().clone();
        for listener in listeners {
            listener(self, value);
        }
    }

    /// Append a value and notify `push` listeners
    ///
    /// Lists are flattened and each element pushed in order. Pushing the
    /// instance onto itself is silently ignored.
    ///
    /// Values are held strongly. Two instances pushed onto each other (or a
    /// listener capturing its own instance) form a reference cycle and are
    /// never freed; transport still terminates on such graphs.
    pub fn push(&self, item: impl Into<Value>) -> &Self {
        self.push_value(item.into());
        self
    }

    /// Push every item in order
    pub fn push_all<I>(&self, items: I) -> &Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        for item in items {
            self.push_value(item.into());
        }
        self
    }

    fn push_value(&self, item: Value) {
        match item {
            Value::Error(ref other) if other.same_instance(self) => {
                tracing::trace!(name = %self.name(), "dropped self-referential push");
            }
            Value::List(items) => {
                for item in items {
                    self.push_value(item);
                }
            }
            item => {
                self.inner.values.borrow_mut().push(item.clone());
                self.notify_push(&item);
            }
        }
    }

    /// Subscribe to an event by name
    ///
    /// Only `push` can be subscribed to; `constructed` has already fired (or
    /// been scheduled) by the time a caller holds the instance.
    pub fn on<F>(&self, event: &str, listener: F) -> Result<&Self>
    where
        F: Fn(&ErrorInstance, &Value) + 'static,
    {
        match event.parse::<HookEvent>()? {
            HookEvent::Push => Ok(self.on_push(listener)),
            HookEvent::Constructed => Err(LineageError::unsupported_event(event)),
        }
    }

    /// Subscribe to `push`
    pub fn on_push<F>(&self, listener: F) -> &Self
    where
        F: Fn(&ErrorInstance, &Value) + 'static,
    {
        self.inner.channel.push.borrow_mut().push(Rc::new(listener));
        self
    }

    pub fn error_type(&self) -> &ErrorType {
        &self.inner.error_type
    }

    /// Whether this instance's type is `ty` or descends from it
    pub fn is_instance_of(&self, ty: &ErrorType) -> bool {
        ty.is_ancestor_of(&self.inner.error_type)
    }

    /// Identity comparison
    pub fn same_instance(&self, other: &ErrorInstance) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Rendered `name` field, or the type name when it is not a string
    pub fn name(&self) -> String {
        match self.field(keys::NAME) {
            Some(Value::String(name)) => name.clone(),
            _ => self.inner.error_type.name(),
        }
    }

    /// Caller message, or the rendered message template
    pub fn message(&self) -> String {
        self.field(keys::MESSAGE)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned()
    }

    /// Any field, structural ones included
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.inner.fields.get(key)
    }

    /// Non-structural fields in spec order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner
            .fields
            .iter()
            .filter(|(key, _)| !spec::is_structural(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    pub(crate) fn all_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.fields.iter()
    }

    /// Snapshot of the attached values
    pub fn values(&self) -> Vec<Value> {
        self.inner.values.borrow().clone()
    }

    pub(crate) fn with_values<R>(&self, f: impl FnOnce(&[Value]) -> R) -> R {
        f(&self.inner.values.borrow())
    }

    pub fn value_count(&self) -> usize {
        self.inner.values.borrow().len()
    }

    pub fn has_values(&self) -> bool {
        self.value_count() > 0
    }

    /// Error-first callback bridge: this instance if it carries values
    pub fn callback_value(&self) -> Option<ErrorInstance> {
        self.has_values().then(|| self.clone())
    }

    /// `Err(self)` if this instance carries values, `Ok(ok)` otherwise
    pub fn into_result<T>(self, ok: T) -> std::result::Result<T, ErrorInstance> {
        if self.has_values() { Err(self) } else { Ok(ok) }
    }

    pub fn has_stack(&self) -> bool {
        self.inner.stack.is_some()
    }

    /// Stack captured at construction, rendered with a `name: message` header
    pub fn stack(&self) -> Option<String> {
        self.inner
            .stack
            .as_ref()
            .map(|trace| format!("{}: {}\n{trace:?}", self.name(), self.message()))
    }

    pub fn serialize_stack(&self) -> bool {
        self.inner.serialize_stack
    }

    pub fn async_construct(&self) -> bool {
        self.inner.async_construct
    }

    /// Plain, JSON-safe snapshot using the family's stack policy
    pub fn transport(&self) -> serde_json::Value {
        transport::transport_with(
            &Value::Error(self.clone()),
            self.inner.error_type.stack_policy(),
        )
    }

    /// Identical to [`ErrorInstance::transport`]
    pub fn to_json(&self) -> serde_json::Value {
        self.transport()
    }
}

/// Entry points whose frames are cut from captured stacks
const CONSTRUCTOR_FRAMES: [&str; 4] = [
    "lineage::instance::ErrorInstance::construct",
    "lineage::error_type::ErrorType::create",
    "lineage::error_type::ErrorType::message",
    "lineage::convert::<impl lineage::error_type::ErrorType>::from",
];

/// Capture the caller's stack, starting at the first frame outside the
/// library's constructors
fn capture_stack() -> Backtrace {
    let frames: Vec<BacktraceFrame> = Backtrace::new().into();
    let start = frames.iter().position(is_constructor_frame).map_or(0, |first| {
        first + frames[first..].iter().take_while(|frame| is_constructor_frame(frame)).count()
    });
    frames.into_iter().skip(start).collect::<Vec<_>>().into()
}

/// Inlined symbols come innermost first; the last one names the frame
fn is_constructor_frame(frame: &BacktraceFrame) -> bool {
    frame
        .symbols()
        .last()
        .and_then(|symbol| symbol.name())
        .is_some_and(|name| {
            let name = format!("{name:#}");
            CONSTRUCTOR_FRAMES
                .iter()
                .any(|marker| name.starts_with(marker))
        })
}

impl fmt::Display for ErrorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl fmt::Debug for ErrorInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorInstance")
            .field("name", &self.name())
            .field("message", &self.message())
            .field("values", &self.value_count())
            .field("stack", &self.has_stack())
            .finish()
    }
}

impl std::error::Error for ErrorInstance {}
