use indexmap::IndexMap;

use crate::value::Value;

/// A parsed but unresolved node. All three block dialects normalize to the
/// same `Object` shape here, so everything downstream is dialect-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Literal(Value),
    /// `$name` (global = true) or a bare dotted path (global = false).
    VarRef { path: Vec<String>, global: bool },
    /// A string with `${...}` fragments, concatenation order preserved.
    Interp(Vec<Fragment>),
    OperatorCall { name: String, args: Vec<RawNode> },
    Array(Vec<RawNode>),
    Object(IndexMap<String, RawNode>),
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Text(String),
    Ref(Vec<String>),
}

/// The unresolved output of a parse: the root object plus the `$global`
/// side table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawDocument {
    pub root: IndexMap<String, RawNode>,
    pub globals: IndexMap<String, RawNode>,
}

impl RawNode {
    pub fn as_object(&self) -> Option<&IndexMap<String, RawNode>> {
        if let RawNode::Object(items) = self {
            Some(items)
        } else {
            None
        }
    }
}
