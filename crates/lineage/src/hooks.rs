//! Lifecycle events and hook tables
//!
//! Two events exist: `constructed` fires once per instance, `push` fires once
//! per value appended to an instance. Type-level hooks are shared across
//! threads; per-instance listeners are not.

use core::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::LineageError;
use crate::instance::ErrorInstance;
use crate::value::Value;

/// Hook fired when an instance has been constructed
pub type ConstructedHook = Arc<dyn Fn(&ErrorInstance) + Send + Sync>;

/// Hook fired for every value pushed onto an instance
pub type PushHook = Arc<dyn Fn(&ErrorInstance, &Value) + Send + Sync>;

/// Lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookEvent {
    Constructed,
    Push,
}

impl HookEvent {
    pub const ALL: [Self; 2] = [Self::Constructed, Self::Push];

    /// Event name as used by `on`
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Push => "push",
        }
    }

    /// Reserved key declaring a hook for this event in a spec bag
    pub const fn spec_key(self) -> &'static str {
        match self {
            Self::Constructed => "onConstructed",
            Self::Push => "onPush",
        }
    }

    /// Look up the event a reserved spec key refers to
    pub fn from_spec_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|event| event.spec_key() == key)
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| LineageError::unknown_event(s))
    }
}

/// Ordered hook lists of one error type, ancestors first
#[derive(Clone, Default)]
pub struct HookTable {
    constructed: Vec<ConstructedHook>,
    push: Vec<PushHook>,
}

impl HookTable {
    pub fn constructed(&self) -> &[ConstructedHook] {
        &self.constructed
    }

    pub fn push(&self) -> &[PushHook] {
        &self.push
    }

    /// Number of hooks registered for `event`
    pub fn len(&self, event: HookEvent) -> usize {
        match event {
            HookEvent::Constructed => self.constructed.len(),
            HookEvent::Push => self.push.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.constructed.is_empty() && self.push.is_empty()
    }

    pub(crate) fn append_constructed(&mut self, hook: ConstructedHook) {
        self.constructed.push(hook);
    }

    pub(crate) fn append_push(&mut self, hook: PushHook) {
        self.push.push(hook);
    }

    pub(crate) fn clear(&mut self, event: HookEvent) {
        match event {
            HookEvent::Constructed => self.constructed.clear(),
            HookEvent::Push => self.push.clear(),
        }
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("constructed", &self.constructed.len())
            .field("push", &self.push.len())
            .finish()
    }
}
