//! Integration tests for scoped macro resolution

use doctex::doc::{
    Container, ContainerKind, DocPos, Document, DocumentGraph, Element, Include, Inset, Layout,
    MacroDef, Paragraph, PosFrame,
};
use doctex::MacroNest;

fn definition(id: u32, name: &str, replacement: &str) -> Paragraph {
    Paragraph {
        id,
        layout: Layout::plain(),
        depth: 0,
        language: None,
        elements: vec![Element::Inset(Inset::MacroDef(MacroDef {
            name: name.to_string(),
            num_args: 0,
            replacement: replacement.to_string(),
        }))],
    }
}

fn inclusion(id: u32, child: &str) -> Paragraph {
    Paragraph {
        id,
        layout: Layout::plain(),
        depth: 0,
        language: None,
        elements: vec![Element::Inset(Inset::Include(Include {
            child: child.to_string(),
        }))],
    }
}

fn nest_for(graph: &DocumentGraph) -> MacroNest {
    let mut nest = MacroNest::new();
    nest.rebuild(graph);
    nest
}

#[test]
fn test_single_definition_visible_from_its_paragraph_on() {
    let graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            definition(1, "emph", "\\textit{#1}"),
            Paragraph::text(2, "a"),
            Paragraph::text(3, "b"),
        ]),
    );
    let nest = nest_for(&graph);

    for par in 0..3 {
        assert!(
            nest.resolve("main", "emph", &DocPos::root(par, 0), false).is_some(),
            "expected emph visible at paragraph {}",
            par
        );
    }
}

#[test]
fn test_scope_correctness_same_definition_throughout() {
    // One definition covering both query positions resolves to the
    // same data at both.
    let graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            definition(1, "f", "only"),
            Paragraph::text(2, "a"),
            Paragraph::text(3, "b"),
        ]),
    );
    let nest = nest_for(&graph);
    let early = nest.resolve("main", "f", &DocPos::root(1, 0), false).unwrap();
    let late = nest.resolve("main", "f", &DocPos::root(2, 5), false).unwrap();
    assert_eq!(early, late);
}

#[test]
fn test_shadowing_later_definition_wins() {
    let graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            definition(1, "f", "first"),
            definition(2, "f", "second"),
            Paragraph::text(3, "x"),
        ]),
    );
    let nest = nest_for(&graph);
    let visible = nest.resolve("main", "f", &DocPos::root(2, 0), false).unwrap();
    assert_eq!(visible.replacement, "second");
}

#[test]
fn test_forced_container_scope_does_not_leak() {
    let graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            Paragraph {
                id: 1,
                layout: Layout::plain(),
                depth: 0,
                language: None,
                elements: vec![Element::Inset(Inset::Container(Container {
                    id: 8,
                    kind: ContainerKind::Boxed,
                    own_macro_scope: true,
                    paragraphs: vec![definition(2, "boxed", "b")],
                }))],
            },
            Paragraph::text(3, "outside"),
        ]),
    );
    let nest = nest_for(&graph);

    let inside = DocPos::root(0, 0).descended(PosFrame::new(8, 0, 1));
    assert!(nest.resolve("main", "boxed", &inside, false).is_some());
    assert!(nest
        .resolve("main", "boxed", &DocPos::root(1, 0), false)
        .is_none());
}

#[test]
fn test_child_registered_once_at_first_inclusion() {
    let mut graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            Paragraph::text(1, "before"),
            inclusion(2, "chapter"),
            Paragraph::text(3, "between"),
            inclusion(4, "chapter"),
        ]),
    );
    graph.documents.insert(
        "chapter".to_string(),
        Document::new(vec![definition(10, "chap", "c")]),
    );
    let nest = nest_for(&graph);

    let inclusions = nest.inclusions("main");
    assert_eq!(inclusions.len(), 1);
    assert_eq!(inclusions[0].position, DocPos::root(1, 0));
    assert_eq!(inclusions[0].child, "chapter");
}

#[test]
fn test_child_shadows_enclosing_definition_after_inclusion() {
    let mut graph = DocumentGraph::single(
        "main",
        Document::new(vec![
            definition(1, "title", "parent"),
            inclusion(2, "chapter"),
            Paragraph::text(3, "x"),
        ]),
    );
    graph.documents.insert(
        "chapter".to_string(),
        Document::new(vec![definition(10, "title", "child")]),
    );
    let nest = nest_for(&graph);

    // Before the inclusion only the parent definition is visible.
    let before = nest
        .resolve("main", "title", &DocPos::root(0, 1), false)
        .unwrap();
    assert_eq!(before.replacement, "parent");
    // After it, the child's definition shadows.
    let after = nest
        .resolve("main", "title", &DocPos::root(2, 0), false)
        .unwrap();
    assert_eq!(after.replacement, "child");
}

#[test]
fn test_local_resolution_ignores_children() {
    let mut graph = DocumentGraph::single(
        "main",
        Document::new(vec![inclusion(1, "chapter"), Paragraph::text(2, "x")]),
    );
    graph.documents.insert(
        "chapter".to_string(),
        Document::new(vec![definition(10, "only", "child")]),
    );
    let nest = nest_for(&graph);

    let pos = DocPos::root(1, 0);
    assert!(nest.resolve_local("main", "only", &pos).is_none());
    assert!(nest.resolve_with_children("main", "only", &pos).is_some());
}

#[test]
fn test_reentrant_inclusion_cycle_terminates() {
    let mut graph = DocumentGraph::single(
        "main",
        Document::new(vec![inclusion(1, "a"), Paragraph::text(2, "x")]),
    );
    graph.documents.insert(
        "a".to_string(),
        Document::new(vec![inclusion(10, "b")]),
    );
    graph.documents.insert(
        "b".to_string(),
        Document::new(vec![inclusion(20, "main")]),
    );
    let nest = nest_for(&graph);

    // The cycle main -> a -> b -> main must answer, not loop.
    assert!(nest
        .resolve("main", "nowhere", &DocPos::root(1, 0), true)
        .is_none());
    assert!(nest
        .resolve("b", "nowhere", &DocPos::root(0, 1), true)
        .is_none());
}

#[test]
fn test_rebuild_is_idempotent() {
    let graph = DocumentGraph::single(
        "main",
        Document::new(vec![definition(1, "f", "v"), Paragraph::text(2, "x")]),
    );
    let mut nest = MacroNest::new();
    nest.rebuild(&graph);
    nest.rebuild(&graph);
    let found = nest.resolve("main", "f", &DocPos::root(1, 0), false).unwrap();
    assert_eq!(found.replacement, "v");
}
