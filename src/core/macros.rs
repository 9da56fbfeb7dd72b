//! Position-scoped macro resolution across included documents.
//!
//! Every user macro definition is visible over a position range: from
//! its defining position to the end of the enclosing scope. A child
//! document included by the parent contributes its own table, and can
//! shadow an enclosing definition only from its point of inclusion
//! onward. Inclusion edges may form cycles, so every resolution entry
//! carries an on-stack visited set instead of relying on a flag.

use std::collections::BTreeMap;
use std::sync::Mutex;

use fxhash::{FxHashMap, FxHashSet};
use lazy_static::lazy_static;
use tracing::debug;

use doctex_doc::{
    DocPos, DocumentGraph, Element, Inset, InsetId, MacroDef, Paragraph, PosFrame,
};

/// Expansion data of one macro definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroData {
    pub name: String,
    pub num_args: usize,
    pub replacement: String,
}

impl MacroData {
    fn from_def(def: &MacroDef) -> Self {
        Self {
            name: def.name.clone(),
            num_args: def.num_args,
            replacement: def.replacement.clone(),
        }
    }
}

/// One definition together with the end of its visibility range.
#[derive(Debug, Clone)]
pub struct MacroScope {
    /// Exclusive upper bound, always after the defining position.
    pub scope_end: DocPos,
    pub data: MacroData,
}

/// Per name, definitions ordered by defining position.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    by_name: FxHashMap<String, BTreeMap<DocPos, MacroScope>>,
}

impl MacroTable {
    fn insert(&mut self, def_pos: DocPos, scope: MacroScope) {
        self.by_name
            .entry(scope.data.name.clone())
            .or_default()
            .insert(def_pos, scope);
    }

    /// The definition visible at `pos`: the greatest defining position
    /// not after `pos` whose scope end is still after `pos`, walking
    /// backward through earlier same-named definitions otherwise.
    pub fn visible_at(&self, name: &str, pos: &DocPos) -> Option<(&DocPos, &MacroScope)> {
        let defs = self.by_name.get(name)?;
        defs.range(..=pos)
            .rev()
            .find(|(_, scope)| scope.scope_end > *pos)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// A child document registered in its parent's table, once, at its
/// first point of inclusion.
#[derive(Debug, Clone)]
pub struct ChildInclusion {
    pub position: DocPos,
    /// Scope the inclusion belongs to.
    pub scope_end: DocPos,
    pub child: String,
}

/// Macro state of a single document.
#[derive(Debug, Clone, Default)]
pub struct DocumentMacros {
    pub table: MacroTable,
    /// In document order (first occurrence order of the DFS walk).
    pub children: Vec<ChildInclusion>,
    /// Position just past the last paragraph, still inside the
    /// top-level scope. Queries here see the document's latest visible
    /// definitions.
    end_query: DocPos,
}

/// On-stack visited set threaded through every resolution entry. A
/// document already on the stack answers "not found", which terminates
/// mutual parent/child reference cycles.
#[derive(Debug, Default)]
pub struct ResolveScope {
    on_stack: FxHashSet<String>,
}

impl ResolveScope {
    pub fn new() -> Self {
        Self::default()
    }

    fn enter(&mut self, key: &str) -> bool {
        self.on_stack.insert(key.to_string())
    }

    fn leave(&mut self, key: &str) {
        self.on_stack.remove(key);
    }
}

lazy_static! {
    /// Process-wide macro table consulted as the last resolution step.
    static ref GLOBAL_MACROS: Mutex<FxHashMap<String, MacroData>> =
        Mutex::new(FxHashMap::default());
}

/// Register a macro in the process-wide table.
pub fn define_global_macro(data: MacroData) {
    let mut table = GLOBAL_MACROS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.insert(data.name.clone(), data);
}

/// Look up a macro in the process-wide table.
pub fn global_macro(name: &str) -> Option<MacroData> {
    let table = GLOBAL_MACROS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.get(name).cloned()
}

/// Macro tables of a whole document bundle, rebuilt from scratch on
/// every resolution pass.
#[derive(Debug, Default)]
pub struct MacroNest {
    docs: FxHashMap<String, DocumentMacros>,
    /// Child key → including document key, set at first inclusion.
    parents: FxHashMap<String, String>,
    built: FxHashSet<String>,
}

impl MacroNest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything and repopulate from the graph root.
    pub fn rebuild(&mut self, graph: &DocumentGraph) {
        self.docs.clear();
        self.parents.clear();
        self.built.clear();
        let mut guard = ResolveScope::new();
        self.build_document(graph, &graph.root, &mut guard);
        debug!(
            documents = self.docs.len(),
            "rebuilt macro tables from {}", graph.root
        );
    }

    /// Ensure the table of one document exists, building it on demand.
    /// Called by the serializer before emitting macro-using content.
    pub fn update(&mut self, graph: &DocumentGraph, key: &str) {
        if !self.built.contains(key) {
            let mut guard = ResolveScope::new();
            self.build_document(graph, key, &mut guard);
        }
    }

    pub fn document(&self, key: &str) -> Option<&DocumentMacros> {
        self.docs.get(key)
    }

    /// Inclusion records of a document, in first-occurrence order.
    pub fn inclusions(&self, key: &str) -> &[ChildInclusion] {
        self.docs
            .get(key)
            .map(|dm| dm.children.as_slice())
            .unwrap_or(&[])
    }

    fn build_document(&mut self, graph: &DocumentGraph, key: &str, guard: &mut ResolveScope) {
        if !guard.enter(key) {
            return;
        }
        let Some(doc) = graph.documents.get(key) else {
            debug!("inclusion of unknown document {key}");
            guard.leave(key);
            return;
        };
        let mut dm = DocumentMacros {
            end_query: DocPos::root(doc.paragraphs.len(), 0),
            ..DocumentMacros::default()
        };
        let scope_end = doc.macro_scope_end();
        let mut pending_children = Vec::new();
        collect_run(
            &doc.paragraphs,
            doctex_doc::ROOT_CONTAINER,
            &DocPos::default(),
            &scope_end,
            &mut dm,
            &mut pending_children,
        );
        self.docs.insert(key.to_string(), dm);
        self.built.insert(key.to_string());
        for child in pending_children {
            self.parents
                .entry(child.clone())
                .or_insert_with(|| key.to_string());
            if !self.built.contains(&child) {
                self.build_document(graph, &child, guard);
            }
        }
        guard.leave(key);
    }

    /// Resolve a name at a position, trying the document itself, its
    /// registered children, the including parent, and finally the
    /// process-wide table when `allow_global` is set.
    pub fn resolve(
        &self,
        key: &str,
        name: &str,
        pos: &DocPos,
        allow_global: bool,
    ) -> Option<MacroData> {
        let mut scope = ResolveScope::new();
        self.resolve_entry(key, name, pos, allow_global, &mut scope)
    }

    /// Resolution restricted to this document's own table.
    pub fn resolve_local(&self, key: &str, name: &str, pos: &DocPos) -> Option<MacroData> {
        self.local_candidate(key, name, pos).map(|(_, data)| data)
    }

    /// Resolution over the document and its registered children, with
    /// the child-shadowing rule applied.
    pub fn resolve_with_children(&self, key: &str, name: &str, pos: &DocPos) -> Option<MacroData> {
        let mut scope = ResolveScope::new();
        scope.enter(key);
        self.children_candidate(key, name, pos, &mut scope)
    }

    fn resolve_entry(
        &self,
        key: &str,
        name: &str,
        pos: &DocPos,
        allow_global: bool,
        scope: &mut ResolveScope,
    ) -> Option<MacroData> {
        if !scope.enter(key) {
            return None;
        }
        let mut result = self.children_candidate(key, name, pos, scope);
        if result.is_none() {
            result = self.parent_candidate(key, name, allow_global, scope);
        }
        if result.is_none() && allow_global {
            result = global_macro(name);
        }
        scope.leave(key);
        result
    }

    fn local_candidate(&self, key: &str, name: &str, pos: &DocPos) -> Option<(DocPos, MacroData)> {
        let dm = self.docs.get(key)?;
        dm.table
            .visible_at(name, pos)
            .map(|(def_pos, scope)| (def_pos.clone(), scope.data.clone()))
    }

    /// Local lookup plus the child tables. A child candidate wins only
    /// when its inclusion position is strictly after the best local
    /// defining position (on a tie the local definition wins), lies at
    /// or before the query position, and its inclusion scope still
    /// covers the query.
    fn children_candidate(
        &self,
        key: &str,
        name: &str,
        pos: &DocPos,
        scope: &mut ResolveScope,
    ) -> Option<MacroData> {
        let dm = self.docs.get(key)?;
        let local = self.local_candidate(key, name, pos);
        let mut best = local;
        for inclusion in dm.children.iter().rev() {
            if inclusion.position > *pos || inclusion.scope_end <= *pos {
                continue;
            }
            if let Some((best_pos, _)) = &best {
                if inclusion.position <= *best_pos {
                    continue;
                }
            }
            let candidate_pos = self
                .docs
                .get(&inclusion.child)
                .map(|child| child.end_query.clone())
                .unwrap_or_else(DocPos::past_end);
            let candidate = self.resolve_entry(&inclusion.child, name, &candidate_pos, false, scope);
            if let Some(data) = candidate {
                best = Some((inclusion.position.clone(), data));
                // Later inclusions were already visited; earlier ones
                // cannot beat this position.
                break;
            }
        }
        best.map(|(_, data)| data)
    }

    /// Lookup in the including document, at the position where this
    /// document is included.
    fn parent_candidate(
        &self,
        key: &str,
        name: &str,
        allow_global: bool,
        scope: &mut ResolveScope,
    ) -> Option<MacroData> {
        let parent = self.parents.get(key)?;
        let inclusion_pos = self
            .docs
            .get(parent)?
            .children
            .iter()
            .find(|inclusion| inclusion.child == *key)
            .map(|inclusion| inclusion.position.clone())?;
        self.resolve_entry(parent, name, &inclusion_pos, allow_global, scope)
    }
}

/// DFS over one paragraph run, collecting definitions and inclusions.
fn collect_run(
    pars: &[Paragraph],
    container: InsetId,
    prefix: &DocPos,
    scope_end: &DocPos,
    dm: &mut DocumentMacros,
    children_out: &mut Vec<String>,
) {
    for (par_index, par) in pars.iter().enumerate() {
        let mut offset = 0usize;
        for element in &par.elements {
            match element {
                Element::Chars(text) => {
                    offset += text.chars().count();
                }
                Element::Inset(inset) => {
                    let pos = prefix.descended(PosFrame::new(container, par_index, offset));
                    match inset {
                        Inset::MacroDef(def) => {
                            if valid_definition(def) {
                                dm.table.insert(
                                    pos,
                                    MacroScope {
                                        scope_end: scope_end.clone(),
                                        data: MacroData::from_def(def),
                                    },
                                );
                            } else {
                                debug!("skipping invalid macro definition '{}'", def.name);
                            }
                        }
                        Inset::Container(c) => {
                            // A container may force its own scope,
                            // ending just after the container itself.
                            let inner_end = if c.own_macro_scope {
                                pos.advanced(1)
                            } else {
                                scope_end.clone()
                            };
                            collect_run(&c.paragraphs, c.id, &pos, &inner_end, dm, children_out);
                        }
                        Inset::Include(include) => {
                            let seen = dm
                                .children
                                .iter()
                                .any(|inclusion| inclusion.child == include.child);
                            if !seen {
                                dm.children.push(ChildInclusion {
                                    position: pos,
                                    scope_end: scope_end.clone(),
                                    child: include.child.clone(),
                                });
                            }
                            if !children_out.contains(&include.child) {
                                children_out.push(include.child.clone());
                            }
                        }
                        Inset::Math(_) | Inset::MacroCall(_) => {}
                    }
                    offset += 1;
                }
            }
        }
    }
}

/// An empty name or a replacement that invokes the macro itself makes
/// a definition invalid; invalid definitions are skipped silently.
pub(crate) fn valid_definition(def: &MacroDef) -> bool {
    if def.name.is_empty() || !def.name.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    !invokes_name(&def.replacement, &def.name)
}

fn invokes_name(replacement: &str, name: &str) -> bool {
    let needle = format!("\\{}", name);
    let mut search = replacement;
    while let Some(found) = search.find(&needle) {
        let after = &search[found + needle.len()..];
        match after.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => {}
            _ => return true,
        }
        search = after;
    }
    false
}
