// License: MIT

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::IvoryError;
use crate::ast::{Fragment, RawDocument, RawNode};
use crate::document::Document;
use crate::operators::{ContextInputs, EvalContext, OperatorRegistry};
use crate::value::Value;

/// Two-phase resolution. Phase 1 indexes every declared path so references
/// work regardless of textual order; phase 2 resolves depth-first with
/// memoization, so each distinct path is evaluated at most once and
/// side-effecting operators fire once no matter how often the path is
/// referenced.
pub(crate) fn resolve<'a>(
    doc: &'a RawDocument,
    registry: &'a OperatorRegistry,
    inputs: ContextInputs<'a>,
) -> Result<Document, IvoryError> {
    let mut resolver = Resolver {
        index: build_index(doc),
        memo: IndexMap::new(),
        stack: Vec::new(),
        secrets: HashSet::new(),
        registry,
        inputs,
    };

    let mut globals = IndexMap::new();
    for name in doc.globals.keys() {
        let value = resolver.resolve_path(&format!("${}", name))?;
        globals.insert(name.clone(), value);
    }

    let mut root = IndexMap::new();
    for key in doc.root.keys() {
        let value = resolver.resolve_path(key)?;
        root.insert(key.clone(), value);
    }

    Ok(Document::new(root, globals, resolver.secrets))
}

struct Resolver<'a> {
    /// Dotted path → raw node, globals under `$name`.
    index: IndexMap<String, &'a RawNode>,
    /// Paths resolved so far; the at-most-once guarantee lives here.
    memo: IndexMap<String, Value>,
    /// Paths currently being resolved, for cycle detection.
    stack: Vec<String>,
    secrets: HashSet<String>,
    registry: &'a OperatorRegistry,
    inputs: ContextInputs<'a>,
}

fn build_index<'a>(doc: &'a RawDocument) -> IndexMap<String, &'a RawNode> {
    let mut index = IndexMap::new();
    for (name, node) in &doc.globals {
        index_node(&mut index, format!("${}", name), node);
    }
    for (key, node) in &doc.root {
        index_node(&mut index, key.clone(), node);
    }
    index
}

fn index_node<'a>(index: &mut IndexMap<String, &'a RawNode>, path: String, node: &'a RawNode) {
    if let RawNode::Object(items) = node {
        for (key, child) in items {
            index_node(index, format!("{}.{}", path, key), child);
        }
    }
    index.insert(path, node);
}

impl<'a> Resolver<'a> {
    fn resolve_path(&mut self, key: &str) -> Result<Value, IvoryError> {
        if let Some(value) = self.memo.get(key) {
            return Ok(value.clone());
        }

        if let Some(pos) = self.stack.iter().position(|p| p == key) {
            let mut cycle: Vec<String> = self.stack[pos..].to_vec();
            cycle.push(key.to_string());
            return Err(IvoryError::CyclicReference { cycle });
        }

        let node = match self.index.get(key) {
            Some(node) => *node,
            None => {
                return Err(IvoryError::UnresolvedReference {
                    path: key.split('.').map(String::from).collect(),
                });
            }
        };

        self.stack.push(key.to_string());
        let value = match node {
            RawNode::Object(items) => {
                // addressable children go through their own path so the
                // memo is shared with direct references to them
                let mut resolved = IndexMap::new();
                for child_key in items.keys() {
                    let child_path = format!("{}.{}", key, child_key);
                    resolved.insert(child_key.clone(), self.resolve_path(&child_path)?);
                }
                Value::Object(resolved)
            }
            other => self.resolve_node(other)?,
        };
        self.stack.pop();

        self.memo.insert(key.to_string(), value.clone());
        Ok(value)
    }

    fn resolve_node(&mut self, node: &'a RawNode) -> Result<Value, IvoryError> {
        match node {
            RawNode::Literal(value) => Ok(value.clone()),
            RawNode::VarRef { path, global } => self.resolve_ref(path, *global),
            RawNode::Interp(fragments) => {
                let mut out = String::new();
                for fragment in fragments {
                    match fragment {
                        Fragment::Text(text) => out.push_str(text),
                        Fragment::Ref(path) => {
                            let value = self.resolve_ref(path, false)?;
                            out.push_str(&value.to_display_string());
                        }
                    }
                }
                Ok(Value::String(out))
            }
            RawNode::OperatorCall { name, args } => {
                // bottom-up: arguments first, then the enclosing call
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.resolve_node(arg)?);
                }

                let ctx = EvalContext::new(&self.inputs, &self.memo);
                let result = self.registry.dispatch(name, &values, &ctx)?;

                if self.registry.is_secret(name) {
                    if let Some(path) = self.stack.last() {
                        self.secrets.insert(path.clone());
                    }
                }

                Ok(result)
            }
            RawNode::Array(items) => {
                let mut resolved = Vec::with_capacity(items.len());
                for item in items {
                    resolved.push(self.resolve_node(item)?);
                }
                Ok(Value::Array(resolved))
            }
            RawNode::Object(items) => {
                // anonymous object (inline in an array or operator call);
                // not addressable, so no memo entry
                let mut resolved = IndexMap::new();
                for (key, child) in items {
                    resolved.insert(key.clone(), self.resolve_node(child)?);
                }
                Ok(Value::Object(resolved))
            }
        }
    }

    /// Lookup rule: `$name` resolves only against globals. A bare or
    /// interpolated path tries the globals table first when it is a single
    /// segment, then the document index from the root.
    fn resolve_ref(&mut self, path: &[String], global: bool) -> Result<Value, IvoryError> {
        if global {
            let key = format!("${}", path[0]);
            if !self.index.contains_key(&key) {
                return Err(unresolved(path, true));
            }
            let base = self.resolve_path(&key)?;
            return navigate(base, &path[1..], path, true);
        }

        if path.len() == 1 {
            let global_key = format!("${}", path[0]);
            if self.index.contains_key(&global_key) {
                return self.resolve_path(&global_key);
            }
            return self.resolve_path(&path[0]);
        }

        let dotted = path.join(".");
        if self.index.contains_key(&dotted) {
            return self.resolve_path(&dotted);
        }

        // a dotted path may also reach into an object-valued global
        let global_key = format!("${}", path[0]);
        if self.index.contains_key(&global_key) {
            let base = self.resolve_path(&global_key)?;
            return navigate(base, &path[1..], path, false);
        }

        Err(unresolved(path, false))
    }
}

fn navigate(
    base: Value,
    rest: &[String],
    full: &[String],
    global: bool,
) -> Result<Value, IvoryError> {
    let mut current = base;
    for segment in rest {
        current = match current.get(segment) {
            Some(value) => value.clone(),
            None => return Err(unresolved(full, global)),
        };
    }
    Ok(current)
}

fn unresolved(path: &[String], global: bool) -> IvoryError {
    let mut shown: Vec<String> = path.to_vec();
    if global {
        shown[0] = format!("${}", shown[0]);
    }
    IvoryError::UnresolvedReference { path: shown }
}
