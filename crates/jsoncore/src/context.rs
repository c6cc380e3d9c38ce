use core::fmt;
use std::sync::Arc;

use crate::{
    error::{JsonError, Result},
    location::Location,
};

/// The kind of container a context frame tracks.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Root,
    Array,
    Object,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerKind::Root => "ROOT",
            ContainerKind::Array => "ARRAY",
            ContainerKind::Object => "OBJECT",
        })
    }
}

/// A by-value view of a path component.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathItem {
    /// A property name inside a JSON object.
    Key(Arc<str>),
    /// An index into a JSON array.
    Index(usize),
}

impl From<&str> for PathItem {
    fn from(value: &str) -> Self {
        PathItem::Key(value.into())
    }
}

impl From<usize> for PathItem {
    fn from(value: usize) -> Self {
        PathItem::Index(value)
    }
}

/// One frame of the parser's context stack.
#[derive(Debug, Clone)]
pub struct ReadContext {
    kind: ContainerKind,
    entry_count: usize,
    name: Option<Arc<str>>,
    start: Location,
}

impl ReadContext {
    fn new(kind: ContainerKind, start: Location) -> Self {
        Self {
            kind,
            entry_count: 0,
            name: None,
            start,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Number of values (arrays, root) or properties (objects) seen so far,
    /// including the current one.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Zero-based index of the current entry, if any.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.entry_count.checked_sub(1)
    }

    /// The most recent property name in an object frame.
    #[must_use]
    pub fn current_name(&self) -> Option<&Arc<str>> {
        self.name.as_ref()
    }

    /// Where the container's start marker was read.
    #[must_use]
    pub fn start_location(&self) -> Location {
        self.start
    }

    #[must_use]
    pub fn in_array(&self) -> bool {
        self.kind == ContainerKind::Array
    }

    #[must_use]
    pub fn in_object(&self) -> bool {
        self.kind == ContainerKind::Object
    }

    #[must_use]
    pub fn in_root(&self) -> bool {
        self.kind == ContainerKind::Root
    }
}

/// The stack of open containers. The bottom frame is always the root.
#[derive(Debug, Clone)]
pub(crate) struct ContextStack {
    frames: Vec<ReadContext>,
    max_depth: usize,
}

impl ContextStack {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            frames: vec![ReadContext::new(ContainerKind::Root, Location::START)],
            max_depth,
        }
    }

    pub(crate) fn current(&self) -> &ReadContext {
        // The root frame is never popped.
        &self.frames[self.frames.len() - 1]
    }

    pub(crate) fn parent(&self) -> Option<&ReadContext> {
        self.frames.len().checked_sub(2).map(|ix| &self.frames[ix])
    }

    fn current_mut(&mut self) -> &mut ReadContext {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Nesting depth; 0 at root.
    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Records that a new value starts in the current array or root frame.
    pub(crate) fn expect_value(&mut self) {
        let cur = self.current_mut();
        if cur.kind != ContainerKind::Object {
            cur.entry_count += 1;
        }
    }

    pub(crate) fn set_name(&mut self, name: Arc<str>) {
        let cur = self.current_mut();
        cur.entry_count += 1;
        cur.name = Some(name);
    }

    pub(crate) fn push(&mut self, kind: ContainerKind, start: Location) -> Result<()> {
        if self.depth() >= self.max_depth {
            return Err(JsonError::constraint(format!(
                "document nesting depth ({}) exceeds the maximum allowed ({})",
                self.depth() + 1,
                self.max_depth
            )));
        }
        self.frames.push(ReadContext::new(kind, start));
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Option<ReadContext> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// The path from the root to the current position.
    pub(crate) fn path(&self) -> Vec<PathItem> {
        let mut path = Vec::with_capacity(self.frames.len());
        for frame in &self.frames[1..] {
            match frame.kind {
                ContainerKind::Array => {
                    if let Some(ix) = frame.current_index() {
                        path.push(PathItem::Index(ix));
                    }
                }
                ContainerKind::Object => {
                    if let Some(name) = &frame.name {
                        path.push(PathItem::Key(name.clone()));
                    }
                }
                ContainerKind::Root => {}
            }
        }
        path
    }
}

/// Renders a path as a JSON Pointer (RFC 6901).
#[must_use]
pub fn json_pointer(path: &[PathItem]) -> String {
    let mut out = String::new();
    for item in path {
        out.push('/');
        match item {
            PathItem::Key(k) => {
                for c in k.chars() {
                    match c {
                        '~' => out.push_str("~0"),
                        '/' => out.push_str("~1"),
                        _ => out.push(c),
                    }
                }
            }
            PathItem::Index(i) => out.push_str(&i.to_string()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_tracks_depth() {
        let mut stack = ContextStack::new(2);
        assert_eq!(stack.depth(), 0);
        stack.push(ContainerKind::Array, Location::START).unwrap();
        stack.push(ContainerKind::Object, Location::START).unwrap();
        let err = stack.push(ContainerKind::Array, Location::START).unwrap_err();
        assert!(err.is_constraint());
        assert_eq!(stack.pop().unwrap().kind(), ContainerKind::Object);
        assert_eq!(stack.pop().unwrap().kind(), ContainerKind::Array);
        assert!(stack.pop().is_none());
        assert!(stack.current().in_root());
    }

    #[test]
    fn path_and_pointer() {
        let mut stack = ContextStack::new(10);
        stack.expect_value();
        stack.push(ContainerKind::Object, Location::START).unwrap();
        stack.set_name("a/b".into());
        stack.push(ContainerKind::Array, Location::START).unwrap();
        stack.expect_value();
        stack.expect_value();
        let path = stack.path();
        assert_eq!(path, vec![PathItem::from("a/b"), PathItem::from(1)]);
        assert_eq!(json_pointer(&path), "/a~1b/1");
    }
}
