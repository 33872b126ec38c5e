//! Variable environment for Atom
//!
//! A tree of lexical scopes. Each scope borrows its enclosing scope, so a
//! child can never outlive its parent and never keeps it alive.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::diagnostic::{Diagnostic, Reporter, RuntimeErrorKind};
use crate::ion::Span;
use crate::value::{ObjectRef, Value};

/// One lexical scope
pub struct Environment<'p> {
    bindings: RefCell<HashMap<String, Value>>,
    /// Names declared here that can never be reassigned
    locked: RefCell<HashSet<String>>,
    parent: Option<&'p Environment<'p>>,
    reporter: &'p dyn Reporter,
}

impl<'p> Environment<'p> {
    /// Create a root scope reporting to `reporter`
    pub fn new(reporter: &'p dyn Reporter) -> Self {
        Self {
            bindings: RefCell::new(HashMap::new()),
            locked: RefCell::new(HashSet::new()),
            parent: None,
            reporter,
        }
    }

    /// Create a child scope; it shares the parent's reporter
    pub fn with_parent(parent: &'p Environment<'p>) -> Self {
        Self {
            bindings: RefCell::new(HashMap::new()),
            locked: RefCell::new(HashSet::new()),
            parent: Some(parent),
            reporter: parent.reporter,
        }
    }

    pub fn parent(&self) -> Option<&Environment<'p>> {
        self.parent
    }

    pub fn report(&self, kind: RuntimeErrorKind, span: Span) {
        self.reporter.report(Diagnostic::new(kind, span));
    }

    /// Nearest scope, starting with this one, that declares `name`.
    /// Reports `UnresolvedName` when no scope in the chain does.
    pub fn resolve(&self, name: &str, span: Span) -> Option<&Environment<'p>> {
        let scope = self.find(name);
        if scope.is_none() {
            self.report(RuntimeErrorKind::UnresolvedName(name.to_string()), span);
        }
        scope
    }

    fn find(&self, name: &str) -> Option<&Environment<'p>> {
        let mut scope = self;
        loop {
            if scope.bindings.borrow().contains_key(name) {
                return Some(scope);
            }
            scope = scope.parent?;
        }
    }

    /// Declare `name` in this scope. Shadowing an outer declaration is
    /// allowed; redeclaring within the same scope is not.
    pub fn declare(&self, name: &str, value: Value, locked: bool, span: Span) -> Value {
        if self.contains_local(name) {
            self.report(RuntimeErrorKind::DuplicateDeclaration(name.to_string()), span);
            return Value::Null;
        }

        log::debug!("declare {} = {:?} (locked: {})", name, value, locked);
        self.bindings.borrow_mut().insert(name.to_string(), value.clone());
        if locked {
            self.locked.borrow_mut().insert(name.to_string());
        }
        value
    }

    pub fn get(&self, name: &str, span: Span) -> Value {
        self.resolve(name, span)
            .and_then(|scope| scope.bindings.borrow().get(name).cloned())
            .unwrap_or(Value::Null)
    }

    /// Overwrite `name` in the scope that declares it
    pub fn set(&self, name: &str, value: Value, span: Span) -> Value {
        let Some(scope) = self.resolve(name, span) else {
            return Value::Null;
        };

        if scope.locked.borrow().contains(name) {
            self.report(RuntimeErrorKind::AssignToLocked(name.to_string()), span);
            return Value::Null;
        }

        log::debug!("set {} = {:?}", name, value);
        scope.bindings.borrow_mut().insert(name.to_string(), value.clone());
        value
    }

    /// Read a property. With `index`, the property at that position in
    /// insertion order is read and `property` is ignored; `Some(0)` is the
    /// first property.
    pub fn get_object_property(
        &self,
        obj: &ObjectRef,
        property: &str,
        span: Span,
        index: Option<usize>,
    ) -> Value {
        let found = {
            let properties = obj.borrow();
            match index {
                Some(i) => properties.get_index(i).map(|(_, v)| v.clone()),
                None => properties.get(property).cloned(),
            }
        };

        found.unwrap_or_else(|| {
            self.report(RuntimeErrorKind::UnknownProperty(describe(property, index)), span);
            Value::Null
        })
    }

    /// Overwrite an existing property, addressed like
    /// [`get_object_property`](Self::get_object_property). Missing
    /// properties are reported, never created.
    pub fn set_object_property(
        &self,
        obj: &ObjectRef,
        property: &str,
        value: Value,
        span: Span,
        index: Option<usize>,
    ) -> Value {
        // Storing an object inside itself would form a cycle; store a copy.
        let value = if value.reaches(obj) { value.deep_copy() } else { value };

        let stored = {
            let mut properties = obj.borrow_mut();
            let slot = match index {
                Some(i) => properties.get_index_mut(i).map(|(_, v)| v),
                None => properties.get_mut(property),
            };
            slot.map(|slot| *slot = value.clone()).is_some()
        };

        if stored {
            value
        } else {
            self.report(RuntimeErrorKind::UnknownProperty(describe(property, index)), span);
            Value::Null
        }
    }

    /// Whether `name` is declared in this scope (ancestors excluded)
    pub fn contains_local(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    /// Whether the scope resolving `name` locks it. Unresolved names are
    /// not locked, and nothing is reported.
    pub fn is_locked(&self, name: &str) -> bool {
        self.find(name)
            .is_some_and(|scope| scope.locked.borrow().contains(name))
    }

    /// Names declared in this scope, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

fn describe(property: &str, index: Option<usize>) -> String {
    match index {
        Some(i) => format!("at index {}", i),
        None => format!("'{}'", property),
    }
}

impl fmt::Debug for Environment<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("bindings", &self.bindings.borrow())
            .field("locked", &self.locked.borrow())
            .field("parent", &self.parent)
            .finish()
    }
}
