use swc_core::{
    common::{SourceMap, DUMMY_SP},
    ecma::{
        ast::*,
        visit::{VisitMut, VisitMutWith},
    },
};

use crate::config::{AttributeKind, TaggerConfig};
use crate::resolver::{ComponentResolver, FunctionShape, UNKNOWN_COMPONENT};
use crate::source::SourceUnit;

/// Tag name written for member-expression elements such as `<Foo.Bar>`.
pub const UNKNOWN_TAG: &str = "unknown";

/// Prepends `{prefix}-*` attributes to every JSX opening element of one file.
///
/// Synthesized attributes carry `DUMMY_SP`; the emitter relies on that to tell
/// them apart from attributes that were already in the source.
pub struct ElementTagger<'a> {
    config: &'a TaggerConfig,
    unit: SourceUnit<'a>,
    source_map: &'a SourceMap,
    resolver: ComponentResolver,
    // Resolved name of each enclosing function-like node, innermost last.
    scopes: Vec<Option<String>>,
    tagged: usize,
}

impl<'a> ElementTagger<'a> {
    pub fn new(config: &'a TaggerConfig, unit: SourceUnit<'a>, source_map: &'a SourceMap) -> Self {
        Self {
            config,
            unit,
            source_map,
            resolver: ComponentResolver::new(unit.stem()),
            scopes: vec![],
            tagged: 0,
        }
    }

    /// Number of elements tagged so far.
    pub fn tagged(&self) -> usize {
        self.tagged
    }

    fn with_scope(&mut self, name: Option<String>, f: impl FnOnce(&mut Self)) {
        self.scopes.push(name);
        f(self);
        self.scopes.pop();
    }

    fn current_component(&self) -> String {
        self.scopes
            .last()
            .cloned()
            .flatten()
            .unwrap_or_else(|| UNKNOWN_COMPONENT.to_string())
    }

    fn tag(&mut self, el: &mut JSXOpeningElement) {
        if el.span.is_dummy() {
            return;
        }

        let component = self.current_component();
        if !self.config.should_tag.allows(&component, self.unit.id()) {
            return;
        }

        // The scope gate already checked this; elements stay untouched if it ever disagrees.
        let Some(rel_path) = self.unit.relative_path(&self.config.base_path) else {
            return;
        };

        let id_attr = self.config.attr_name(AttributeKind::Id);
        if has_attr(&el.attrs, &id_attr) {
            return;
        }

        let line = self.source_map.lookup_char_pos(el.span.lo).line;
        let attrs: Vec<JSXAttrOrSpread> = self
            .config
            .attributes
            .iter()
            .map(|&kind| {
                let value = match kind {
                    AttributeKind::Id => format!("{rel_path}:{line}"),
                    AttributeKind::Name => element_name(&el.name),
                    AttributeKind::Path => rel_path.to_string(),
                    AttributeKind::Line => line.to_string(),
                    AttributeKind::File => self.unit.basename().to_string(),
                    AttributeKind::Component => component.clone(),
                };
                string_attr(&self.config.attr_name(kind), value)
            })
            .collect();

        el.attrs.splice(0..0, attrs);
        self.tagged += 1;
    }
}

impl VisitMut for ElementTagger<'_> {
    fn visit_mut_var_declarator(&mut self, d: &mut VarDeclarator) {
        self.resolver.record_declarator(d);
        d.visit_mut_children_with(self);
    }

    fn visit_mut_export_default_expr(&mut self, n: &mut ExportDefaultExpr) {
        self.resolver.record_default_expr(&n.expr);
        n.visit_mut_children_with(self);
    }

    fn visit_mut_export_default_decl(&mut self, n: &mut ExportDefaultDecl) {
        self.resolver.record_default_decl(&n.decl);
        n.visit_mut_children_with(self);
    }

    fn visit_mut_fn_decl(&mut self, n: &mut FnDecl) {
        let name = self
            .resolver
            .resolve(FunctionShape::Declaration(&n.ident), n.function.span.lo);
        self.with_scope(name, |this| n.visit_mut_children_with(this));
    }

    fn visit_mut_fn_expr(&mut self, n: &mut FnExpr) {
        let name = self
            .resolver
            .resolve(FunctionShape::Expression(n.ident.as_ref()), n.function.span.lo);
        self.with_scope(name, |this| n.visit_mut_children_with(this));
    }

    fn visit_mut_arrow_expr(&mut self, n: &mut ArrowExpr) {
        let name = self.resolver.resolve(FunctionShape::Arrow, n.span.lo);
        self.with_scope(name, |this| n.visit_mut_children_with(this));
    }

    fn visit_mut_jsx_opening_element(&mut self, n: &mut JSXOpeningElement) {
        self.tag(n);
        n.visit_mut_children_with(self);
    }
}

/// `<div>` → `div`, `<svg:rect>` → `svg:rect`; member tags (`<Foo.Bar>`) have no plain name.
pub fn element_name(name: &JSXElementName) -> String {
    match name {
        JSXElementName::Ident(id) => id.sym.to_string(),
        JSXElementName::JSXNamespacedName(n) => format!("{}:{}", n.ns.sym, n.name.sym),
        JSXElementName::JSXMemberExpr(_) => UNKNOWN_TAG.to_string(),
    }
}

pub fn has_attr(attrs: &[JSXAttrOrSpread], key: &str) -> bool {
    attrs.iter().any(|attr| {
        if let JSXAttrOrSpread::JSXAttr(jsx_attr) = attr {
            if let JSXAttrName::Ident(ident) = &jsx_attr.name {
                return ident.sym.as_ref() == key;
            }
        }
        false
    })
}

fn string_attr(key: &str, val: String) -> JSXAttrOrSpread {
    JSXAttrOrSpread::JSXAttr(JSXAttr {
        span: DUMMY_SP,
        name: JSXAttrName::Ident(IdentName::new(key.into(), DUMMY_SP)),
        value: Some(JSXAttrValue::Lit(Lit::Str(Str {
            span: DUMMY_SP,
            value: val.into(),
            raw: None,
        }))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TagFilter, TaggerOptions};
    use swc_core::common::FileName;
    use swc_core::ecma::parser::{Parser, StringInput, Syntax, TsSyntax};

    fn attr_pairs(el: &JSXOpeningElement) -> Vec<(String, String)> {
        el.attrs
            .iter()
            .filter_map(|a| match a {
                JSXAttrOrSpread::JSXAttr(JSXAttr {
                    name: JSXAttrName::Ident(name),
                    value: Some(JSXAttrValue::Lit(Lit::Str(s))),
                    ..
                }) => Some((name.sym.to_string(), s.value.to_string())),
                _ => None,
            })
            .collect()
    }

    struct Openings(Vec<Vec<(String, String)>>);

    impl swc_core::ecma::visit::Visit for Openings {
        fn visit_jsx_opening_element(&mut self, n: &JSXOpeningElement) {
            self.0.push(attr_pairs(n));
            swc_core::ecma::visit::VisitWith::visit_children_with(n, self);
        }
    }

    fn run(config: &TaggerConfig, id: &str, code: &str) -> (usize, Vec<Vec<(String, String)>>) {
        let cm = SourceMap::default();
        let fm = cm.new_source_file(FileName::Custom(id.into()).into(), code.to_string());
        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
        let mut program = parser.parse_program().unwrap();

        let unit = SourceUnit::new(id, code);
        let mut tagger = ElementTagger::new(config, unit, &cm);
        program.visit_mut_with(&mut tagger);

        let mut openings = Openings(vec![]);
        swc_core::ecma::visit::VisitWith::visit_with(&program, &mut openings);
        (tagger.tagged(), openings.0)
    }

    fn pair(k: &str, v: &str) -> (String, String) {
        (k.to_string(), v.to_string())
    }

    #[test]
    fn prepends_all_attributes_in_order() {
        let cfg = TaggerConfig::resolve(
            TaggerOptions {
                prefix: Some("ref".into()),
                ..Default::default()
            },
            None,
        );
        let code = "export function Hero() {\n  return <h1 className=\"t\">Hi</h1>;\n}\n";
        let (count, openings) = run(&cfg, "/p/src/ui/Hero.tsx", code);

        assert_eq!(count, 1);
        assert_eq!(
            openings[0],
            vec![
                pair("ref-id", "src/ui/Hero.tsx:2"),
                pair("ref-name", "h1"),
                pair("ref-path", "src/ui/Hero.tsx"),
                pair("ref-line", "2"),
                pair("ref-file", "Hero.tsx"),
                pair("ref-component", "Hero"),
                pair("className", "t"),
            ]
        );
    }

    #[test]
    fn existing_id_attribute_is_left_alone() {
        let cfg = TaggerConfig::default();
        let code = "const A = () => <div data-ref-id=\"src/A.tsx:9\" />;";
        let (count, openings) = run(&cfg, "/p/src/A.tsx", code);
        assert_eq!(count, 0);
        assert_eq!(openings[0], vec![pair("data-ref-id", "src/A.tsx:9")]);
    }

    #[test]
    fn filter_can_skip_components() {
        let cfg = TaggerConfig::resolve(
            TaggerOptions {
                attributes: Some(vec![AttributeKind::Component]),
                should_tag: Some(TagFilter::new(|name, _| name != "Skip")),
                ..Default::default()
            },
            None,
        );
        let code = "function Skip() { return <a /> }\nfunction Keep() { return <b /> }";
        let (count, openings) = run(&cfg, "/p/src/A.tsx", code);
        assert_eq!(count, 1);
        assert!(openings[0].is_empty());
        assert_eq!(openings[1], vec![pair("data-ref-component", "Keep")]);
    }

    #[test]
    fn outside_base_path_is_never_tagged() {
        let cfg = TaggerConfig::default();
        let (count, _) = run(&cfg, "/p/lib/A.tsx", "const A = () => <div />;");
        assert_eq!(count, 0);
    }

    #[test]
    fn element_names() {
        let cfg = TaggerConfig::resolve(
            TaggerOptions {
                attributes: Some(vec![AttributeKind::Name]),
                ..Default::default()
            },
            None,
        );
        let code = "const A = () => <Foo.Bar><svg:rect /><Card /></Foo.Bar>;";
        let (_, openings) = run(&cfg, "/p/src/A.tsx", code);
        assert_eq!(openings[0], vec![pair("data-ref-name", UNKNOWN_TAG)]);
        assert_eq!(openings[1], vec![pair("data-ref-name", "svg:rect")]);
        assert_eq!(openings[2], vec![pair("data-ref-name", "Card")]);
    }

    #[test]
    fn nested_callback_resolves_to_unknown() {
        let cfg = TaggerConfig::resolve(
            TaggerOptions {
                attributes: Some(vec![AttributeKind::Component]),
                ..Default::default()
            },
            None,
        );
        let code = "function List() {\n  return <ul>{items.map((i) => <li>{i}</li>)}</ul>;\n}";
        let (_, openings) = run(&cfg, "/p/src/List.tsx", code);
        assert_eq!(openings[0], vec![pair("data-ref-component", "List")]);
        assert_eq!(openings[1], vec![pair("data-ref-component", "unknown")]);
    }

    #[test]
    fn assigned_map_callback_takes_the_variable_name() {
        let cfg = TaggerConfig::resolve(
            TaggerOptions {
                attributes: Some(vec![AttributeKind::Component]),
                ..Default::default()
            },
            None,
        );
        let code = "function List() {\n  const rows = items.map((i) => <li>{i}</li>);\n  return <ul>{rows}</ul>;\n}";
        let (_, openings) = run(&cfg, "/p/src/List.tsx", code);
        assert_eq!(openings[0], vec![pair("data-ref-component", "rows")]);
        assert_eq!(openings[1], vec![pair("data-ref-component", "List")]);
    }
}
