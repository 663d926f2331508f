use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::editor::{EditorCallback, EditorSetting, DEFAULT_EDITOR};
use crate::error::Result;
use crate::pattern::{self, Pattern};

pub const DEFAULT_PREFIX: &str = "data-ref";
pub const DEFAULT_BASE_PATH: &str = "src";

/// Descriptive attribute injected on each tagged element, named `{prefix}-{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Id,
    Name,
    Path,
    Line,
    File,
    Component,
}

impl AttributeKind {
    /// Emission order.
    pub const ALL: [AttributeKind; 6] = [
        AttributeKind::Id,
        AttributeKind::Name,
        AttributeKind::Path,
        AttributeKind::Line,
        AttributeKind::File,
        AttributeKind::Component,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AttributeKind::Id => "id",
            AttributeKind::Name => "name",
            AttributeKind::Path => "path",
            AttributeKind::Line => "line",
            AttributeKind::File => "file",
            AttributeKind::Component => "component",
        }
    }
}

/// Per-element opt-out hook, called with `(component_name, normalized_file_id)`.
#[derive(Clone)]
pub struct TagFilter(Arc<dyn Fn(&str, &str) -> bool + Send + Sync>);

impl TagFilter {
    pub fn new(f: impl Fn(&str, &str) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn accept_all() -> Self {
        Self::new(|_, _| true)
    }

    pub fn allows(&self, component: &str, file: &str) -> bool {
        (self.0)(component, file)
    }
}

impl fmt::Debug for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TagFilter(..)")
    }
}

/// User-facing options. Every field is optional and overrides its default on its own.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggerOptions {
    pub prefix: Option<String>,
    pub attributes: Option<Vec<AttributeKind>>,
    pub base_path: Option<String>,
    pub include: Option<Pattern>,
    pub exclude: Option<Pattern>,
    pub enabled: Option<bool>,
    pub editor: Option<String>,
    #[serde(skip)]
    pub should_tag: Option<TagFilter>,
    #[serde(skip)]
    pub open_in_editor: Option<EditorCallback>,
}

impl TaggerOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Options merged with defaults. Built once per plugin instance and only read afterwards.
#[derive(Debug, Clone)]
pub struct TaggerConfig {
    pub prefix: String,
    pub attributes: BTreeSet<AttributeKind>,
    /// Trimmed of one leading and one trailing slash.
    pub base_path: String,
    pub include: Pattern,
    pub exclude: Pattern,
    pub enabled: bool,
    pub should_tag: TagFilter,
    pub editor: EditorSetting,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self::resolve(TaggerOptions::default(), None)
    }
}

impl TaggerConfig {
    /// Merge `options` over the defaults. `editor_override` (the environment's choice)
    /// wins over `options.editor`.
    pub fn resolve(options: TaggerOptions, editor_override: Option<String>) -> Self {
        let base_path = options
            .base_path
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
        let preference = editor_override
            .filter(|e| !e.is_empty())
            .or(options.editor)
            .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

        Self {
            prefix: options.prefix.unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            attributes: options
                .attributes
                .map(|kinds| kinds.into_iter().collect())
                .unwrap_or_else(|| AttributeKind::ALL.into_iter().collect()),
            base_path: trim_base_path(&base_path).to_string(),
            include: options
                .include
                .unwrap_or_else(|| Pattern::any([".tsx", ".jsx"])),
            exclude: options
                .exclude
                .unwrap_or_else(|| Pattern::any(["node_modules", "main.tsx"])),
            enabled: options.enabled.unwrap_or(true),
            should_tag: options.should_tag.unwrap_or_else(TagFilter::accept_all),
            editor: EditorSetting {
                preference,
                callback: options.open_in_editor,
            },
        }
    }

    pub fn attr_name(&self, kind: AttributeKind) -> String {
        format!("{}-{}", self.prefix, kind.as_str())
    }

    pub fn in_scope(&self, normalized_id: &str) -> bool {
        pattern::in_scope(normalized_id, &self.include, &self.exclude, &self.base_path)
    }
}

fn trim_base_path(raw: &str) -> &str {
    let s = raw.strip_prefix('/').unwrap_or(raw);
    s.strip_suffix('/').unwrap_or(s)
}
