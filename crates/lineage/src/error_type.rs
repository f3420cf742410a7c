//! Error types and the extension engine
//!
//! An [`ErrorType`] is an immutable descriptor: a resolved spec table, a
//! resolved hook table and a link to the type it was extended from. Types
//! form a linked list up to a root; the root's configuration (depth cap,
//! stack policy) is inherited by every descendant.

use core::fmt;
use std::sync::{Arc, LazyLock};

use crate::config::LineageConfig;
use crate::error::{LineageError, Result};
use crate::hooks::HookTable;
use crate::instance::ErrorInstance;
use crate::spec::{self, ErrorSpec, SpecTable, keys};
use crate::template;
use crate::transport::StackPolicy;
use crate::value::Value;

static DEFAULT_ROOT: LazyLock<ErrorType> = LazyLock::new(|| ErrorType::root_with(&LineageConfig::default()));

/// A node in an error type hierarchy
///
/// Cloning is cheap and clones compare equal with [`ErrorType::same_type`].
#[derive(Clone)]
pub struct ErrorType {
    inner: Arc<TypeInner>,
}

struct TypeInner {
    spec: SpecTable,
    hooks: HookTable,
    parent: Option<ErrorType>,
    depth: usize,
    max_depth: usize,
    stack_policy: StackPolicy,
}

impl ErrorType {
    /// The process-wide default root family
    pub fn root() -> Self {
        DEFAULT_ROOT.clone()
    }

    /// Create a new, independent root family
    pub fn root_with(config: &LineageConfig) -> Self {
        let mut spec = SpecTable::new();
        spec.insert(keys::NAME.to_owned(), config.root_name.clone().into());
        spec.insert(keys::MESSAGE.to_owned(), config.default_message.clone().into());
        spec.insert(keys::SERIALIZE_STACK.to_owned(), false.into());

        Self {
            inner: Arc::new(TypeInner {
                spec,
                hooks: HookTable::default(),
                parent: None,
                depth: 0,
                max_depth: config.max_depth,
                stack_policy: config.stack_policy,
            }),
        }
    }

    /// Create a child type from declared overrides
    ///
    /// Fails when the child would sit at or beyond the family's maximum depth.
    pub fn extend(&self, overrides: ErrorSpec) -> Result<Self> {
        let depth = self.inner.depth + 1;
        if depth >= self.inner.max_depth {
            tracing::warn!(
                parent = %self.name(),
                depth,
                max = self.inner.max_depth,
                "inheritance limit reached"
            );
            return Err(LineageError::inheritance_limit(self.name(), depth, self.inner.max_depth));
        }

        let (spec, hooks) = spec::merge(&self.inner.spec, &self.inner.hooks, &overrides);
        let child = Self {
            inner: Arc::new(TypeInner {
                spec,
                hooks,
                parent: Some(self.clone()),
                depth,
                max_depth: self.inner.max_depth,
                stack_policy: self.inner.stack_policy,
            }),
        };

        tracing::debug!(
            name = %child.name(),
            parent = %self.name(),
            depth,
            hooks = ?child.inner.hooks,
            "extended error type"
        );
        Ok(child)
    }

    /// Extend repeatedly, returning `self` followed by every new descendant
    pub fn extend_chain<I>(&self, specs: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = ErrorSpec>,
    {
        let mut chain = vec![self.clone()];
        for overrides in specs {
            let next = chain[chain.len() - 1].extend(overrides)?;
            chain.push(next);
        }
        Ok(chain)
    }

    /// Construct an instance from a raw argument list
    ///
    /// The first truthy string is the message; everything else (with lists
    /// flattened and falsy values dropped) becomes the instance's values.
    pub fn create<I>(&self, args: I) -> ErrorInstance
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        ErrorInstance::construct(self.clone(), args.into_iter().map(Into::into))
    }

    /// Construct an instance with just a message
    pub fn message(&self, message: impl Into<String>) -> ErrorInstance {
        self.create([Value::String(message.into())])
    }

    /// Rendered display name
    pub fn name(&self) -> String {
        match self.inner.spec.get(keys::NAME) {
            Some(serde_json::Value::String(name)) => template::render_str(name, &self.inner.spec),
            _ => self
                .parent()
                .map_or_else(|| "Error".to_owned(), ErrorType::name),
        }
    }

    /// Resolved field defaults, templates unrendered
    pub fn spec(&self) -> &SpecTable {
        &self.inner.spec
    }

    /// Resolved hooks, ancestors first
    pub fn hooks(&self) -> &HookTable {
        &self.inner.hooks
    }

    pub fn parent(&self) -> Option<&ErrorType> {
        self.inner.parent.as_ref()
    }

    /// Number of `extend` steps from the root
    pub fn depth(&self) -> usize {
        self.inner.depth
    }

    pub fn max_depth(&self) -> usize {
        self.inner.max_depth
    }

    pub fn stack_policy(&self) -> StackPolicy {
        self.inner.stack_policy
    }

    /// The root of this type's family
    pub fn root_type(&self) -> &ErrorType {
        let mut current = self;
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// This type, then each ancestor up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = &ErrorType> {
        std::iter::successors(Some(self), |ty| ty.parent())
    }

    /// Identity comparison
    pub fn same_type(&self, other: &ErrorType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether `other` descends from this type (or is this type)
    pub fn is_ancestor_of(&self, other: &ErrorType) -> bool {
        other.ancestors().any(|ty| ty.same_type(self))
    }

    /// Whether `instance` belongs to the same root family
    pub fn is_family(&self, instance: &ErrorInstance) -> bool {
        self.root_type().same_type(instance.error_type().root_type())
    }
}

impl fmt::Debug for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorType")
            .field("name", &self.name())
            .field("depth", &self.inner.depth)
            .field("spec", &self.inner.spec)
            .field("hooks", &self.inner.hooks)
            .finish()
    }
}
