//! Integration tests for full document serialization

use pretty_assertions::assert_eq;

use doctex::doc::{
    Container, ContainerKind, Document, DocumentGraph, DocumentSettings, Element, Include, Inset,
    Layout, MacroCall, MacroDef, Math, Paragraph,
};
use doctex::{render_document, render_single, RenderOptions, RenderOutput};

fn render(document: Document) -> RenderOutput {
    render_single(document, &RenderOptions::default()).expect("generation succeeds")
}

fn quote_par(id: u32, text: &str) -> Paragraph {
    Paragraph {
        id,
        layout: Layout::environment("Quotation", "quote"),
        depth: 0,
        language: None,
        elements: vec![Element::Chars(text.to_string())],
    }
}

// ============================================================================
// Environment grouping
// ============================================================================

mod environments {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_style_run_shares_one_pair() {
        let output = render(Document::new(vec![
            quote_par(1, "first"),
            quote_par(2, "second"),
            quote_par(3, "third"),
        ]));
        assert_eq!(output.content.matches("\\begin{quote}").count(), 1);
        assert_eq!(output.content.matches("\\end{quote}").count(), 1);
        for text in ["first", "second", "third"] {
            assert!(output.content.contains(text), "missing {}", text);
        }
    }

    #[test]
    fn test_style_change_closes_environment() {
        let mut verse = quote_par(3, "lines");
        verse.layout = Layout::environment("Verse", "verse");
        let output = render(Document::new(vec![
            quote_par(1, "a"),
            quote_par(2, "b"),
            verse,
        ]));
        assert_eq!(output.content.matches("\\begin{quote}").count(), 1);
        assert_eq!(output.content.matches("\\begin{verse}").count(), 1);
        let quote_end = output.content.find("\\end{quote}").unwrap();
        let verse_begin = output.content.find("\\begin{verse}").unwrap();
        assert!(quote_end < verse_begin);
    }

    #[test]
    fn test_command_layout_wraps_content() {
        let section = Paragraph {
            id: 1,
            layout: Layout::command("Section", "section"),
            depth: 0,
            language: None,
            elements: vec![Element::Chars("Intro".to_string())],
        };
        let output = render(Document::new(vec![section]));
        assert!(output.content.contains("\\section{Intro}"));
    }

    #[test]
    fn test_deeper_run_wrapped_in_indent_block() {
        let mut deep1 = Paragraph::text(2, "inner one");
        deep1.depth = 1;
        let mut deep2 = Paragraph::text(3, "inner two");
        deep2.depth = 1;
        let output = render(Document::new(vec![
            Paragraph::text(1, "outer"),
            deep1,
            deep2,
            Paragraph::text(4, "outer again"),
        ]));
        assert_eq!(output.content.matches("\\begin{adjustwidth}").count(), 1);
        assert_eq!(output.content.matches("\\end{adjustwidth}").count(), 1);
        let packages: Vec<&str> = output.hints.packages().collect();
        assert!(packages.contains(&"changepage"));
    }

    #[test]
    fn test_blank_line_between_same_style_paragraphs() {
        let output = render(Document::new(vec![
            Paragraph::text(1, "one"),
            Paragraph::text(2, "two"),
        ]));
        assert!(output.content.contains("one\n\ntwo"));
    }
}

// ============================================================================
// Language and encoding switching
// ============================================================================

mod languages {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rtl_language_span_is_bracketed() {
        let mut hebrew = Paragraph::text(2, "שלום");
        hebrew.language = Some("hebrew".to_string());
        let output = render(Document::new(vec![Paragraph::text(1, "hello"), hebrew]));

        let open = output.content.find("\\begin{hebrew}").unwrap();
        let text = output.content.find("שלום").unwrap();
        let close = output.content.find("\\end{hebrew}").unwrap();
        assert!(open < text && text < close);
        assert_eq!(
            output.content.matches("\\begin{hebrew}").count(),
            output.content.matches("\\end{hebrew}").count()
        );
    }

    #[test]
    fn test_ltr_switch_uses_selectlanguage() {
        let mut german = Paragraph::text(2, "Grüße");
        german.language = Some("german".to_string());
        let output = render(Document::new(vec![
            Paragraph::text(1, "hello"),
            german,
            Paragraph::text(3, "back"),
        ]));
        assert!(output.content.contains("\\selectlanguage{ngerman}"));
        // Switching back to the document language closes nothing but
        // re-selects it.
        assert!(output.content.contains("\\selectlanguage{english}"));
        let langs: Vec<&str> = output.hints.languages().collect();
        assert_eq!(langs, vec!["english", "ngerman"]);
    }

    #[test]
    fn test_encoding_switch_emitted_before_content() {
        let mut german = Paragraph::text(1, "Grüße");
        german.language = Some("german".to_string());
        let output = render(Document::new(vec![german]));
        let directive = output.content.find("\\inputencoding{latin1}").unwrap();
        let text = output.content.find("Grüße").unwrap();
        assert!(directive < text);
    }

    #[test]
    fn test_ascii_paragraph_forces_no_switch() {
        let mut german = Paragraph::text(1, "plain ascii only");
        german.language = Some("german".to_string());
        let output = render(Document::new(vec![german]));
        assert!(!output.content.contains("\\inputencoding"));
    }

    #[test]
    fn test_cjk_content_bracketed_in_cjk_environment() {
        let mut japanese = Paragraph::text(1, "こんにちは");
        japanese.language = Some("japanese".to_string());
        let output = render(Document::new(vec![
            japanese,
            Paragraph::text(2, "and back to ascii"),
        ]));
        assert_eq!(output.content.matches("\\begin{CJK}{JIS}{}").count(), 1);
        assert_eq!(output.content.matches("\\end{CJK}").count(), 1);
    }

    #[test]
    fn test_global_encoding_switch_opens_once() {
        let settings = DocumentSettings {
            language: "english".to_string(),
            encoding: "utf8".to_string(),
            global_encoding_switch: true,
        };
        let output = render(Document::with_settings(
            vec![Paragraph::text(1, "a"), Paragraph::text(2, "b")],
            settings,
        ));
        assert_eq!(output.content.matches("\\inputencoding{utf8}").count(), 1);
        assert!(output.content.starts_with("\\inputencoding{utf8}\n"));
    }
}

// ============================================================================
// Uncodable characters
// ============================================================================

mod uncodable {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dry_run_substitutes_placeholder() {
        let document = Document::new(vec![Paragraph::text(1, "for all: ∀")]);
        let output = render_single(document, &RenderOptions::preview()).unwrap();
        assert!(output.content.contains("[uncodable: ∀]"));
        assert!(output.uncodable.is_empty());
    }

    #[test]
    fn test_final_pass_collects_diagnostic() {
        let output = render(Document::new(vec![Paragraph::text(1, "for all: ∀")]));
        assert!(!output.content.contains('∀'));
        assert_eq!(output.uncodable.len(), 1);
        let entry = output.uncodable[0];
        assert_eq!(entry.ch, '∀');
        assert_eq!(entry.par, 1);
        assert_eq!(entry.start, 9);
        assert_eq!(entry.end, 10);
    }

    #[test]
    fn test_markup_substitute_avoids_diagnostic() {
        let output = render(Document::new(vec![Paragraph::text(1, "price: 5€")]));
        assert!(output.content.contains("\\texteuro{}"));
        assert!(output.uncodable.is_empty());
    }

    #[test]
    fn test_specials_are_escaped() {
        let output = render(Document::new(vec![Paragraph::text(1, "50% & more_x")]));
        assert!(output.content.contains("50\\% \\& more\\_x"));
    }
}

// ============================================================================
// Row map
// ============================================================================

mod rows {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_primary_entries_round_trip() {
        let output = render(Document::new(vec![
            Paragraph::text(1, "one"),
            Paragraph::text(2, "two"),
            Paragraph::text(3, "three"),
        ]));
        for row in output.rows.entries() {
            let Some(entry) = row.text else { continue };
            let line = output.rows.row_for_text(entry.par, entry.pos).unwrap();
            assert_eq!(output.rows.entry_at(line), Some(entry));
        }
    }

    #[test]
    fn test_math_cells_map_to_distinct_lines() {
        let math = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Inset(Inset::Math(Math {
                id: 9,
                cells: vec!["a &= b".to_string(), "c &= d".to_string()],
            }))],
        };
        let output = render(Document::new(vec![math]));
        assert!(output.content.contains("\\begin{align*}"));
        let first = output.rows.row_for_math(9, 0).unwrap();
        let second = output.rows.row_for_math(9, 1).unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_inline_math_shares_text_line() {
        let par = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![
                Element::Chars("see ".to_string()),
                Element::Inset(Inset::Math(Math {
                    id: 9,
                    cells: vec!["x^2".to_string()],
                })),
            ],
        };
        let output = render(Document::new(vec![par]));
        assert!(output.content.contains("\\(x^2\\)"));
        let text_line = output.rows.row_for_text(1, 0).unwrap();
        assert_eq!(output.rows.row_for_math(9, 0), Some(text_line));
    }

    #[test]
    fn test_compiler_log_routes_to_paragraph() {
        let output = render(Document::new(vec![
            Paragraph::text(10, "first"),
            Paragraph::text(20, "second"),
        ]));
        let line = output.rows.row_for_text(20, 0).unwrap();
        let log = format!("! Undefined control sequence.\nl.{} \\oops\n", line);
        let diagnostics = doctex::route_log(&log, &output.rows);
        assert_eq!(diagnostics.len(), 1);
        let entry = diagnostics[0].entry.unwrap();
        assert_eq!(entry.par, 20);
    }
}

// ============================================================================
// Macros and inclusion in the output stream
// ============================================================================

mod macros_in_output {
    use super::*;
    use pretty_assertions::assert_eq;

    fn def_element(name: &str, num_args: usize, replacement: &str) -> Element {
        Element::Inset(Inset::MacroDef(MacroDef {
            name: name.to_string(),
            num_args,
            replacement: replacement.to_string(),
        }))
    }

    #[test]
    fn test_macro_definition_emitted() {
        let par = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![def_element("half", 1, "\\frac{#1}{2}")],
        };
        let output = render(Document::new(vec![par]));
        assert!(output
            .content
            .contains("\\newcommand{\\half}[1]{\\frac{#1}{2}}"));
    }

    #[test]
    fn test_resolved_call_emits_cleanly() {
        let def = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![def_element("half", 1, "\\frac{#1}{2}")],
        };
        let call = Paragraph {
            id: 2,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Inset(Inset::MacroCall(MacroCall {
                name: "half".to_string(),
                args: vec!["x".to_string()],
            }))],
        };
        let output = render(Document::new(vec![def, call]));
        assert!(output.content.contains("\\half{x}"));
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_unresolved_call_warns_but_emits() {
        let call = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Inset(Inset::MacroCall(MacroCall {
                name: "ghost".to_string(),
                args: vec![],
            }))],
        };
        let options = RenderOptions {
            allow_global_macros: false,
            ..RenderOptions::default()
        };
        let output = render_single(Document::new(vec![call]), &options).unwrap();
        assert!(output.content.contains("\\ghost{}"));
        assert!(output.has_warnings());
        assert!(output.warnings[0].message.contains("ghost"));
    }

    #[test]
    fn test_include_emits_input_directive() {
        let include = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Inset(Inset::Include(Include {
                child: "appendix".to_string(),
            }))],
        };
        let mut graph = DocumentGraph::single("main", Document::new(vec![include]));
        graph.documents.insert(
            "appendix".to_string(),
            Document::new(vec![Paragraph::text(10, "extra")]),
        );
        let output = render_document(&graph, &RenderOptions::default()).unwrap();
        assert!(output.content.contains("\\input{appendix}"));
        assert!(!output.has_warnings());
    }

    #[test]
    fn test_dangling_include_warns() {
        let include = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![Element::Inset(Inset::Include(Include {
                child: "missing".to_string(),
            }))],
        };
        let output = render(Document::new(vec![include]));
        assert!(output.content.contains("\\input{missing}"));
        assert!(output.has_warnings());
    }
}

// ============================================================================
// Containers
// ============================================================================

mod containers {
    use super::*;
    use pretty_assertions::assert_eq;

    fn footnote(id: u32, paragraphs: Vec<Paragraph>) -> Element {
        Element::Inset(Inset::Container(Container {
            id,
            kind: ContainerKind::Footnote,
            own_macro_scope: false,
            paragraphs,
        }))
    }

    #[test]
    fn test_footnote_wrapper() {
        let par = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![
                Element::Chars("text".to_string()),
                footnote(5, vec![Paragraph::text(2, "note body")]),
                Element::Chars(" more".to_string()),
            ],
        };
        let output = render(Document::new(vec![par]));
        assert!(output.content.contains("\\footnote{%"));
        assert!(output.content.contains("note body"));
    }

    #[test]
    fn test_container_boundary_protects_encoding_state() {
        // CJK mode must close before the footnote and reopen after it.
        let par = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: Some("japanese".to_string()),
            elements: vec![
                Element::Chars("こんにちは".to_string()),
                footnote(5, vec![Paragraph::text(2, "ascii note")]),
                Element::Chars("さようなら".to_string()),
            ],
        };
        let output = render(Document::new(vec![par]));
        assert_eq!(
            output.content.matches("\\begin{CJK}").count(),
            output.content.matches("\\end{CJK}").count()
        );
        let note = output.content.find("ascii note").unwrap();
        let first_close = output.content.find("\\end{CJK}").unwrap();
        assert!(first_close < note);
    }

    #[test]
    fn test_footnote_rows_map_to_inner_paragraph() {
        let par = Paragraph {
            id: 1,
            layout: Layout::plain(),
            depth: 0,
            language: None,
            elements: vec![
                Element::Chars("text".to_string()),
                footnote(5, vec![Paragraph::text(7, "note body")]),
            ],
        };
        let output = render(Document::new(vec![par]));
        let inner_line = output.rows.row_for_text(7, 0).unwrap();
        assert_eq!(
            output.rows.entry_at(inner_line).map(|entry| entry.par),
            Some(7)
        );
    }
}
