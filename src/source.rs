/// Strip a bundler query suffix (`?v=123`, `?import`) and normalize Windows separators.
pub fn normalize_id(raw: &str) -> String {
    let clean = raw.split('?').next().unwrap_or(raw);
    clean.replace('\\', "/")
}

/// One file entering the transform: normalized identifier plus its text.
#[derive(Debug, Clone, Copy)]
pub struct SourceUnit<'a> {
    id: &'a str,
    code: &'a str,
}

impl<'a> SourceUnit<'a> {
    /// `id` must already be normalized with [`normalize_id`].
    pub fn new(id: &'a str, code: &'a str) -> Self {
        Self { id, code }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn code(&self) -> &'a str {
        self.code
    }

    /// Path starting at the first `/{base_path}/` segment, without the leading slash.
    pub fn relative_path(&self, base_path: &str) -> Option<&'a str> {
        let needle = format!("/{base_path}/");
        self.id.find(&needle).map(|idx| &self.id[idx + 1..])
    }

    /// File name including extension.
    pub fn basename(&self) -> &'a str {
        self.id.rsplit('/').next().unwrap_or(self.id)
    }

    /// File name with the last extension removed.
    pub fn stem(&self) -> &'a str {
        let name = self.basename();
        match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        }
    }
}
