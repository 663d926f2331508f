//! Regeneration of a tagged tree back into source text.
//!
//! Only the synthesized attributes are printed; they are spliced into the
//! original text right after each element's tag name (and type arguments).
//! Everything else is copied verbatim, so no statement changes line.

use swc_core::{
    common::{BytePos, Spanned},
    ecma::{
        ast::*,
        visit::{Visit, VisitWith},
    },
};

#[derive(Debug)]
struct Insertion {
    offset: usize,
    text: String,
}

struct InsertionCollector {
    start_pos: BytePos,
    out: Vec<Insertion>,
}

impl Visit for InsertionCollector {
    fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
        let text: String = n
            .attrs
            .iter()
            .map_while(synthesized_attr)
            .map(|(name, value)| format!(" {name}=\"{}\"", escape_attr_value(&value)))
            .collect();

        if !text.is_empty() && !n.span.is_dummy() {
            let anchor = n
                .type_args
                .as_ref()
                .map(|t| t.span.hi)
                .unwrap_or_else(|| n.name.span().hi);
            self.out.push(Insertion {
                offset: (anchor - self.start_pos).0 as usize,
                text,
            });
        }
        n.visit_children_with(self);
    }
}

fn synthesized_attr(attr: &JSXAttrOrSpread) -> Option<(String, String)> {
    match attr {
        JSXAttrOrSpread::JSXAttr(JSXAttr {
            span,
            name: JSXAttrName::Ident(name),
            value: Some(JSXAttrValue::Lit(Lit::Str(s))),
        }) if span.is_dummy() => Some((name.sym.to_string(), s.value.to_string())),
        _ => None,
    }
}

/// JSX string attributes decode HTML entities and have no backslash escapes.
/// Line breaks are encoded too so the inserted text stays on one line.
fn escape_attr_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Print `program` over `original`, whose first byte sits at `start_pos` in the source map.
pub fn emit_preserving_lines(program: &Program, original: &str, start_pos: BytePos) -> String {
    let mut collector = InsertionCollector {
        start_pos,
        out: vec![],
    };
    program.visit_with(&mut collector);

    let mut insertions = collector.out;
    insertions.sort_by_key(|i| i.offset);

    let extra: usize = insertions.iter().map(|i| i.text.len()).sum();
    let mut out = String::with_capacity(original.len() + extra);
    let mut cursor = 0;
    for ins in insertions {
        out.push_str(&original[cursor..ins.offset]);
        out.push_str(&ins.text);
        cursor = ins.offset;
    }
    out.push_str(&original[cursor..]);
    out
}
