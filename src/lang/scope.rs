use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::lang::types::Dynamic;

/// One link of the lexical scope chain: a mutable name-to-value map plus an
/// optional parent. Lookup walks outward through parents; `set` always
/// writes to the local map and never mutates an ancestor. Scopes are shared
/// by reference counting because closures keep their defining scope alive.
pub struct Scope {
    parent: Option<Rc<RefCell<Scope>>>,
    data: HashMap<String, Dynamic>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            parent: None,
            data: HashMap::new(),
        }
    }
    pub fn with_parent(parent: Rc<RefCell<Scope>>) -> Self {
        Self {
            parent: Some(parent),
            data: HashMap::new(),
        }
    }
    pub fn get(&self, key: &str) -> Option<Dynamic> {
        match self.data.get(key) {
            Some(v) => Some(v.clone()),
            None => {
                let parent = self.parent.clone()?;
                let r = parent.borrow().get(key);
                r
            }
        }
    }
    pub fn set(&mut self, key: &str, value: Dynamic) {
        self.data.insert(key.into(), value);
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[test]
fn test_lookup_walks_parents() {
    let root = Rc::new(RefCell::new(Scope::new()));
    root.borrow_mut().set("x", Dynamic::Number(1.0));
    let child = Scope::with_parent(root.clone());
    assert_eq!(child.get("x"), Some(Dynamic::Number(1.0)));
    assert_eq!(child.get("y"), None);
}

#[test]
fn test_set_shadows_without_touching_parent() {
    let root = Rc::new(RefCell::new(Scope::new()));
    root.borrow_mut().set("x", Dynamic::Number(1.0));
    let mut child = Scope::with_parent(root.clone());
    child.set("x", Dynamic::Number(2.0));
    assert_eq!(child.get("x"), Some(Dynamic::Number(2.0)));
    assert_eq!(root.borrow().get("x"), Some(Dynamic::Number(1.0)));
}

#[test]
fn test_rebinding_overwrites() {
    let mut scope = Scope::new();
    scope.set("x", Dynamic::Number(1.0));
    scope.set("x", Dynamic::Number(2.0));
    assert_eq!(scope.get("x"), Some(Dynamic::Number(2.0)));
}
