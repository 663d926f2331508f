//! Development-time JSX instrumentation.
//!
//! Every JSX opening element in an in-scope file gets `{prefix}-id="path:line"`
//! and related attributes, so a browser script can map a clicked element back to
//! its source and ask the dev server to open it in an editor. Output keeps every
//! original line where it was.

pub mod client_script;
pub mod config;
pub mod editor;
pub mod emit;
pub mod error;
pub mod pattern;
pub mod plugin;
pub mod resolver;
pub mod server;
pub mod source;
pub mod tagger;
pub mod transform;

pub use config::{AttributeKind, TagFilter, TaggerConfig, TaggerOptions};
pub use editor::{EditorCallback, EditorLauncher, LaunchPlan};
pub use error::{Error, Result};
pub use pattern::Pattern;
pub use plugin::{ComponentRefTagger, HostContext, HostMode};
pub use transform::{transform_source, TransformOutput};
