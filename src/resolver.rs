//! Component-name resolution.
//!
//! A JSX element belongs to the nearest enclosing function-like node (function
//! declaration, function expression, arrow). Its name is, in order:
//! the function's own identifier, the simple variable it is assigned to, or the
//! file stem when it is default-exported. Wrapping calls between the function and
//! its binding (`memo(forwardRef(() => ...))`) are looked through. Nothing further
//! out is consulted: an anonymous inner callback resolves to `unknown` even when
//! its outer function is named.

use std::collections::HashMap;

use swc_core::common::BytePos;
use swc_core::ecma::ast::*;

pub const UNKNOWN_COMPONENT: &str = "unknown";

/// The function-like node being entered.
#[derive(Debug, Clone, Copy)]
pub enum FunctionShape<'a> {
    Declaration(&'a Ident),
    Expression(Option<&'a Ident>),
    Arrow,
}

impl<'a> FunctionShape<'a> {
    fn own_name(self) -> Option<&'a Ident> {
        match self {
            FunctionShape::Declaration(id) => Some(id),
            FunctionShape::Expression(id) => id,
            FunctionShape::Arrow => None,
        }
    }
}

/// Where an anonymous function value ends up bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSite {
    Variable(String),
    DefaultExport,
}

/// Per-file resolution state: binding sites recorded by the traversal, keyed by
/// the start position of the function node they bind.
#[derive(Debug)]
pub struct ComponentResolver {
    file_stem: String,
    sites: HashMap<BytePos, BindingSite>,
}

impl ComponentResolver {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
            sites: HashMap::new(),
        }
    }

    /// `const Name = <init>`
    pub fn record_declarator(&mut self, decl: &VarDeclarator) {
        let (Some(binding), Some(init)) = (decl.name.as_ident(), decl.init.as_deref()) else {
            return;
        };
        let name = binding.id.sym.to_string();
        self.record_expr(init, &BindingSite::Variable(name));
    }

    /// `export default <expr>`
    pub fn record_default_expr(&mut self, expr: &Expr) {
        self.record_expr(expr, &BindingSite::DefaultExport);
    }

    /// `export default function () {}`
    pub fn record_default_decl(&mut self, decl: &DefaultDecl) {
        if let DefaultDecl::Fn(f) = decl {
            self.sites.insert(f.function.span.lo, BindingSite::DefaultExport);
        }
    }

    fn record_expr(&mut self, expr: &Expr, site: &BindingSite) {
        match expr {
            Expr::Fn(f) => {
                self.sites.insert(f.function.span.lo, site.clone());
            }
            Expr::Arrow(a) => {
                self.sites.insert(a.span.lo, site.clone());
            }
            Expr::Paren(p) => self.record_expr(&p.expr, site),
            // Higher-order wrapping: the binding passes through every argument of
            // any call, so `const rows = items.map(() => ..)` also names the callback.
            Expr::Call(call) => {
                for arg in call.args.iter().filter(|a| a.spread.is_none()) {
                    self.record_expr(&arg.expr, site);
                }
            }
            _ => {}
        }
    }

    /// Name for a function-like node starting at `start`, or `None` when it has none.
    pub fn resolve(&self, shape: FunctionShape<'_>, start: BytePos) -> Option<String> {
        if let Some(id) = shape.own_name() {
            return Some(id.sym.to_string());
        }
        match self.sites.get(&start)? {
            BindingSite::Variable(name) => Some(name.clone()),
            BindingSite::DefaultExport => Some(self.file_stem.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swc_core::common::{FileName, SourceMap};
    use swc_core::ecma::parser::{Parser, StringInput, Syntax, TsSyntax};
    use swc_core::ecma::visit::{Visit, VisitWith};

    /// Collects the resolved name of every function-like node, in source order.
    struct Names {
        resolver: ComponentResolver,
        out: Vec<Option<String>>,
    }

    impl Visit for Names {
        fn visit_var_declarator(&mut self, n: &VarDeclarator) {
            self.resolver.record_declarator(n);
            n.visit_children_with(self);
        }
        fn visit_export_default_expr(&mut self, n: &ExportDefaultExpr) {
            self.resolver.record_default_expr(&n.expr);
            n.visit_children_with(self);
        }
        fn visit_export_default_decl(&mut self, n: &ExportDefaultDecl) {
            self.resolver.record_default_decl(&n.decl);
            n.visit_children_with(self);
        }
        fn visit_fn_decl(&mut self, n: &FnDecl) {
            let name = self
                .resolver
                .resolve(FunctionShape::Declaration(&n.ident), n.function.span.lo);
            self.out.push(name);
            n.visit_children_with(self);
        }
        fn visit_fn_expr(&mut self, n: &FnExpr) {
            let name = self
                .resolver
                .resolve(FunctionShape::Expression(n.ident.as_ref()), n.function.span.lo);
            self.out.push(name);
            n.visit_children_with(self);
        }
        fn visit_arrow_expr(&mut self, n: &ArrowExpr) {
            let name = self.resolver.resolve(FunctionShape::Arrow, n.span.lo);
            self.out.push(name);
            n.visit_children_with(self);
        }
    }

    fn names(code: &str) -> Vec<Option<String>> {
        let cm = SourceMap::default();
        let fm = cm.new_source_file(FileName::Custom("Widget.tsx".into()).into(), code.to_string());
        let syntax = Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        });
        let mut parser = Parser::new(syntax, StringInput::from(&*fm), None);
        let program = parser.parse_program().unwrap();

        let mut v = Names {
            resolver: ComponentResolver::new("Widget"),
            out: vec![],
        };
        program.visit_with(&mut v);
        v.out
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn declaration_uses_own_name() {
        assert_eq!(names("function Card() { return null }"), vec![some("Card")]);
        assert_eq!(names("export default function App() {}"), vec![some("App")]);
    }

    #[test]
    fn anonymous_value_uses_variable_name() {
        assert_eq!(names("const Foo = () => null;"), vec![some("Foo")]);
        assert_eq!(names("const Foo = function () {};"), vec![some("Foo")]);
        assert_eq!(names("const Foo = (() => null);"), vec![some("Foo")]);
        // own name wins over the variable
        assert_eq!(names("const Foo = function Bar() {};"), vec![some("Bar")]);
    }

    #[test]
    fn default_export_falls_back_to_file_stem() {
        assert_eq!(names("export default () => null;"), vec![some("Widget")]);
        assert_eq!(names("export default function () {}"), vec![some("Widget")]);
    }

    #[test]
    fn climbs_through_wrapping_calls() {
        assert_eq!(
            names("const Input = memo(forwardRef((props, ref) => null));"),
            vec![some("Input")]
        );
        assert_eq!(names("export default memo(function () {});"), vec![some("Widget")]);
    }

    #[test]
    fn any_call_passes_its_binding_to_callback_arguments() {
        assert_eq!(names("const rows = items.map((i) => null);"), vec![some("rows")]);
        assert_eq!(
            names("const onSave = useCallback(() => save(), [save]);"),
            vec![some("onSave")]
        );
        // spread arguments are not looked through
        assert_eq!(names("const x = f(...[() => null]);"), vec![None]);
    }

    #[test]
    fn destructured_and_detached_functions_are_unnamed() {
        assert_eq!(names("const { a } = () => null;"), vec![None]);
        assert_eq!(names("items.map(() => null);"), vec![None]);
    }

    #[test]
    fn inner_callbacks_do_not_inherit_outer_name() {
        assert_eq!(
            names("function List() { return items.map((i) => i); }"),
            vec![some("List"), None]
        );
    }
}
