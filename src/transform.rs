use swc_core::{
    common::{sync::Lrc, FileName, SourceMap, Spanned},
    ecma::{
        ast::Program,
        parser::{Parser, StringInput, Syntax, TsSyntax},
        visit::VisitMutWith,
    },
};
use tracing::debug;

use crate::config::TaggerConfig;
use crate::emit::emit_preserving_lines;
use crate::error::{Error, Result};
use crate::source::{normalize_id, SourceUnit};
use crate::tagger::ElementTagger;

/// Outcome of one per-file transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutput {
    /// The file is out of scope; the host keeps its original text.
    Unchanged,
    Transformed(String),
}

impl TransformOutput {
    pub fn code(&self) -> Option<&str> {
        match self {
            TransformOutput::Unchanged => None,
            TransformOutput::Transformed(code) => Some(code),
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, TransformOutput::Unchanged)
    }
}

/// Tag every JSX element of `code`. Mode and `enabled` checks belong to the caller.
pub fn transform_source(config: &TaggerConfig, code: &str, raw_id: &str) -> Result<TransformOutput> {
    let id = normalize_id(raw_id);
    if !config.in_scope(&id) {
        debug!(file = %id, "outside tagging scope");
        return Ok(TransformOutput::Unchanged);
    }

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Custom(id.clone()).into(), code.to_string());
    let mut program = parse(&cm, &fm, &id)?;

    let unit = SourceUnit::new(&id, &fm.src);
    let mut tagger = ElementTagger::new(config, unit, &cm);
    program.visit_mut_with(&mut tagger);
    debug!(file = %id, tagged = tagger.tagged(), "tagged elements");

    Ok(TransformOutput::Transformed(emit_preserving_lines(
        &program,
        unit.code(),
        fm.start_pos,
    )))
}

fn parse(cm: &SourceMap, fm: &swc_core::common::SourceFile, id: &str) -> Result<Program> {
    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        ..Default::default()
    });
    let mut parser = Parser::new(syntax, StringInput::from(fm), None);

    let to_error = |err: swc_core::ecma::parser::error::Error| {
        let line = cm.lookup_char_pos(err.span().lo).line;
        Error::parse(id, line, err.kind().msg())
    };

    let program = parser.parse_program().map_err(to_error)?;
    // Recovered errors still mean the input is malformed.
    if let Some(err) = parser.take_errors().into_iter().next() {
        return Err(to_error(err));
    }
    Ok(program)
}
