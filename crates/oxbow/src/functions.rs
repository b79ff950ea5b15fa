//! The function table: name -> function definition.

use indexmap::IndexMap;

use crate::{
    intern::StringId,
    tree::{FunctionDef, Node},
};

/// All user-defined functions in a module, in definition order.
///
/// Built by a single walk over the tree; nested definitions are collected
/// too, matching the flat lookup the engine performs at call sites. Shared
/// read-only across analysis invocations.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    map: IndexMap<StringId, FunctionDef>,
}

impl FunctionTable {
    /// Collects every function definition reachable from the module body.
    #[must_use]
    pub fn collect(module: &[Node]) -> Self {
        let mut table = Self::default();
        table.walk(module);
        table
    }

    fn walk(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::FunctionDef(func) => {
                    self.map.insert(func.name.name, func.clone());
                    self.walk(&func.body);
                }
                Node::If { body, orelse, .. } => {
                    self.walk(body);
                    self.walk(orelse);
                }
                Node::For { body, .. } | Node::While { body, .. } => self.walk(body),
                _ => {}
            }
        }
    }

    #[must_use]
    pub fn get(&self, name: StringId) -> Option<&FunctionDef> {
        self.map.get(&name)
    }

    #[must_use]
    pub fn contains(&self, name: StringId) -> bool {
        self.map.contains_key(&name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringId, &FunctionDef)> {
        self.map.iter().map(|(id, func)| (*id, func))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
