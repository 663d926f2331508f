use crate::server::OPEN_IN_EDITOR_PATH;

/// Browser-side listener: Alt+click on a tagged element asks the dev server to
/// open its `file:line` in the editor.
pub fn render(prefix: &str) -> String {
    format!(
        r#"
(function() {{
  const handleEvent = (e) => {{
    if (!e.altKey) return;
    const tagged = e.target.closest('[{prefix}-id]');
    if (!tagged) return;
    e.preventDefault();
    e.stopImmediatePropagation();
    if (e.type === 'mousedown') {{
      const refId = tagged.getAttribute('{prefix}-id');
      const [file, line] = refId.split(':');
      fetch('{OPEN_IN_EDITOR_PATH}?file=' + encodeURIComponent(file) + '&line=' + line);
    }}
  }};
  window.addEventListener('mousedown', handleEvent, true);
  window.addEventListener('click', handleEvent, true);
}})();
"#
    )
}

/// Inline the client script just before `</body>`, or at the end when there is none.
pub fn inject_into_html(html: &str, prefix: &str) -> String {
    let tag = format!("<script>{}</script>\n", render(prefix));
    match html.rfind("</body>") {
        Some(idx) => format!("{}{tag}{}", &html[..idx], &html[idx..]),
        None => format!("{html}{tag}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_uses_prefix_and_endpoint() {
        let js = render("ref");
        assert!(js.contains("closest('[ref-id]')"));
        assert!(js.contains("getAttribute('ref-id')"));
        assert!(js.contains("fetch('/__open-in-editor?file='"));
    }

    #[test]
    fn injects_before_body_close() {
        let html = "<html><body><div id=\"root\"></div></body></html>";
        let out = inject_into_html(html, "data-ref");
        let script_at = out.find("<script>").unwrap();
        assert!(script_at > out.find("<div id=\"root\">").unwrap());
        assert!(script_at < out.find("</body>").unwrap());
        assert!(out.ends_with("</body></html>"));
    }

    #[test]
    fn appends_without_body() {
        let out = inject_into_html("<p>hi</p>", "data-ref");
        assert!(out.starts_with("<p>hi</p><script>"));
    }
}
