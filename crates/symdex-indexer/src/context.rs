//! Scope tracking during a module traversal
//!
//! The tracker follows the traversal through module, namespace, block and
//! class scopes. Imports live in a stack of alias frames: a block that
//! declares its own imports gets a fresh frame that shadows the outer one
//! until the block is left, and namespace or module boundaries wipe the
//! whole stack.

use std::collections::BTreeMap;

/// Mapping from a local (short or aliased) name to the fully qualified import
///
/// Ordered so that case-insensitive lookups are deterministic.
pub type AliasFrame = BTreeMap<String, String>;

/// The class-like declaration currently being visited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRef {
    pub name: String,
    pub namespace: Option<String>,
}

impl ClassRef {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
        }
    }

    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, self.name),
            _ => self.name.clone(),
        }
    }
}

/// Resolves class names written in source to fully qualified names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameResolver {
    pub namespace: Option<String>,
    pub aliases: AliasFrame,
}

impl NameResolver {
    /// Fully qualified name for `name` as written at this point of the module
    pub fn resolve(&self, name: &str) -> String {
        if let Some(qualified) = name.strip_prefix('\\') {
            return qualified.to_string();
        }

        let first_part = name.split('\\').next().unwrap_or(name);
        if let Some(fqn) = self.lookup(first_part) {
            let rest = &name[first_part.len()..];
            return format!("{}{}", fqn, rest);
        }

        match &self.namespace {
            Some(ns) if !ns.is_empty() => format!("{}\\{}", ns, name),
            _ => name.to_string(),
        }
    }

    /// Class names are case-insensitive in PHP; exact matches win, then the
    /// first alias in byte order
    fn lookup(&self, local: &str) -> Option<&str> {
        if let Some(fqn) = self.aliases.get(local) {
            return Some(fqn.as_str());
        }
        self.aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(local))
            .map(|(_, fqn)| fqn.as_str())
    }
}

/// Namespace, class and import state of a traversal
#[derive(Debug, Clone)]
pub struct ScopeTracker {
    namespace: Option<String>,
    current_class: Option<ClassRef>,
    frames: Vec<AliasFrame>,
}

impl Default for ScopeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self {
            namespace: None,
            current_class: None,
            frames: vec![AliasFrame::new()],
        }
    }

    fn reset(&mut self) {
        self.namespace = None;
        self.current_class = None;
        self.frames.clear();
        self.frames.push(AliasFrame::new());
    }

    pub fn enter_module(&mut self) {
        self.reset();
    }

    pub fn exit_module(&mut self) {
        self.reset();
    }

    /// `None` for the unnamed global namespace (`namespace { ... }`)
    pub fn enter_namespace(&mut self, name: Option<String>) {
        self.namespace = name;
        self.frames.clear();
        self.frames.push(AliasFrame::new());
    }

    pub fn exit_namespace(&mut self) {
        self.namespace = None;
        self.frames.clear();
        self.frames.push(AliasFrame::new());
    }

    /// Enter a class-like declaration and return it as tracked
    pub fn enter_class(&mut self, class: ClassRef) -> &ClassRef {
        self.current_class.insert(class)
    }

    pub fn exit_class(&mut self) {
        self.current_class = None;
    }

    /// Open a block scope whose imports shadow the enclosing ones
    pub fn push_block(&mut self) {
        self.frames.push(AliasFrame::new());
    }

    pub fn pop_block(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Bind `local` to `fqn` in the innermost frame; later imports win
    pub fn add_alias(&mut self, local: impl Into<String>, fqn: impl Into<String>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(local.into(), fqn.into());
        }
    }

    /// Imports visible at this point (innermost frame only)
    pub fn aliases(&self) -> &AliasFrame {
        &self.frames[self.frames.len() - 1]
    }

    pub fn alias(&self, local: &str) -> Option<&str> {
        self.aliases().get(local).map(String::as_str)
    }

    /// Snapshot of the resolution state, for sub-traversals
    pub fn resolver(&self) -> NameResolver {
        NameResolver {
            namespace: self.namespace.clone(),
            aliases: self.aliases().clone(),
        }
    }

    pub fn resolve(&self, name: &str) -> String {
        self.resolver().resolve(name)
    }
}
