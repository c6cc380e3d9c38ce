use crate::{
    context::ContainerKind,
    error::{JsonError, Result},
};

/// One frame of the generator's output context.
#[derive(Debug, Clone)]
pub struct WriteContext {
    kind: ContainerKind,
    entry_count: usize,
    name: Option<String>,
    /// A property name was written and its value has not been.
    got_name: bool,
}

impl WriteContext {
    fn new(kind: ContainerKind) -> Self {
        Self {
            kind,
            entry_count: 0,
            name: None,
            got_name: false,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Values (arrays, root) or properties (objects) written so far.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// The last property name written in an object frame.
    #[must_use]
    pub fn current_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether the next write must be a value for a pending property name.
    #[must_use]
    pub fn expects_value(&self) -> bool {
        self.got_name
    }
}

/// What to emit before the next name or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Separator {
    None,
    Comma,
    Colon,
    Root(char),
}

#[derive(Debug, Clone)]
pub(crate) struct WriteContextStack {
    frames: Vec<WriteContext>,
    max_depth: usize,
    root_separator: Option<char>,
}

impl WriteContextStack {
    pub(crate) fn new(max_depth: usize, root_separator: Option<char>) -> Self {
        Self {
            frames: vec![WriteContext::new(ContainerKind::Root)],
            max_depth,
            root_separator,
        }
    }

    pub(crate) fn current(&self) -> &WriteContext {
        &self.frames[self.frames.len() - 1]
    }

    fn current_mut(&mut self) -> &mut WriteContext {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    pub(crate) fn write_name(&mut self, name: &str) -> Result<Separator> {
        let cur = self.current_mut();
        if cur.kind != ContainerKind::Object || cur.got_name {
            return Err(JsonError::write_ordering(
                "cannot write a property name, expecting a value",
            ));
        }
        cur.got_name = true;
        cur.name = Some(name.to_owned());
        cur.entry_count += 1;
        Ok(if cur.entry_count > 1 {
            Separator::Comma
        } else {
            Separator::None
        })
    }

    pub(crate) fn write_value(&mut self) -> Result<Separator> {
        let root_separator = self.root_separator;
        let cur = self.current_mut();
        let separator = match cur.kind {
            ContainerKind::Object => {
                if !cur.got_name {
                    return Err(JsonError::write_ordering(
                        "cannot write a value, expecting a property name",
                    ));
                }
                cur.got_name = false;
                return Ok(Separator::Colon);
            }
            ContainerKind::Array if cur.entry_count > 0 => Separator::Comma,
            ContainerKind::Root if cur.entry_count > 0 => match root_separator {
                Some(sep) => Separator::Root(sep),
                None => {
                    return Err(JsonError::write_ordering(
                        "cannot write a second root value without a root value separator",
                    ));
                }
            },
            _ => Separator::None,
        };
        cur.entry_count += 1;
        Ok(separator)
    }

    pub(crate) fn push(&mut self, kind: ContainerKind) -> Result<()> {
        if self.depth() >= self.max_depth {
            return Err(JsonError::constraint(format!(
                "document nesting depth ({}) exceeds the maximum allowed ({})",
                self.depth() + 1,
                self.max_depth
            )));
        }
        self.frames.push(WriteContext::new(kind));
        Ok(())
    }

    pub(crate) fn pop(&mut self, kind: ContainerKind) -> Result<()> {
        let cur = self.current();
        if cur.kind != kind {
            return Err(JsonError::write_ordering(format!(
                "current context not {} but {}",
                kind, cur.kind
            )));
        }
        if cur.got_name {
            return Err(JsonError::write_ordering(
                "cannot close an object after a property name without a value",
            ));
        }
        self.frames.pop();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_follow_position() {
        let mut stack = WriteContextStack::new(10, Some(' '));
        assert_eq!(stack.write_value().unwrap(), Separator::None);
        stack.push(ContainerKind::Object).unwrap();
        assert_eq!(stack.write_name("a").unwrap(), Separator::None);
        assert_eq!(stack.write_value().unwrap(), Separator::Colon);
        assert_eq!(stack.write_name("b").unwrap(), Separator::Comma);
        assert!(stack.write_name("c").is_err());
        assert_eq!(stack.write_value().unwrap(), Separator::Colon);
        assert_eq!(stack.current().current_name(), Some("b"));
        stack.pop(ContainerKind::Object).unwrap();
        assert_eq!(stack.write_value().unwrap(), Separator::Root(' '));
    }

    #[test]
    fn mismatched_close_is_rejected() {
        let mut stack = WriteContextStack::new(10, None);
        stack.write_value().unwrap();
        stack.push(ContainerKind::Array).unwrap();
        let err = stack.pop(ContainerKind::Object).unwrap_err();
        assert!(err.is_write_ordering());
        assert_eq!(err.to_string(), "invalid write: current context not OBJECT but ARRAY");
    }

    #[test]
    fn second_root_value_needs_a_separator() {
        let mut stack = WriteContextStack::new(10, None);
        stack.write_value().unwrap();
        assert!(stack.write_value().unwrap_err().is_write_ordering());
    }
}
