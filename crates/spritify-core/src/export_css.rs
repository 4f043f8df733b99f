use crate::model::Sheet;
use std::fmt::Write;

/// Selector and image reference used for the generated stylesheet.
#[derive(Debug, Clone)]
pub struct CssOptions {
    /// Selector carrying the `background-image` rule, e.g. `.sprite`.
    pub class_name: String,
    /// URL of the sheet image as seen from the stylesheet.
    pub image_url: String,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            class_name: ".sprite".into(),
            image_url: "sprite.png".into(),
        }
    }
}

/// CSS class for a sprite key: the file name up to its first `.`.
pub fn css_class_name(key: &str) -> String {
    let base = key.rsplit(['/', '\\']).next().unwrap_or(key);
    match base.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => "sprite".to_string(),
    }
}

/// One rule registering the sheet as background, then one rule per sprite in packing order.
pub fn to_css<K: AsRef<str>>(sheet: &Sheet<K>, opts: &CssOptions) -> String {
    let mut css = String::new();
    let _ = writeln!(
        css,
        "{} {{background-image: url(\"{}\");}}",
        opts.class_name, opts.image_url
    );
    for s in &sheet.sprites {
        let _ = writeln!(
            css,
            ".{} {{width: {}px; height: {}px; background-position: {}px {}px;}}",
            css_class_name(s.key.as_ref()),
            s.frame.w,
            s.frame.h,
            -i64::from(s.frame.x),
            -i64::from(s.frame.y),
        );
    }
    css
}

/// Small demo page showing every sprite through the stylesheet at `css_href`.
pub fn to_html_preview<K: AsRef<str>>(sheet: &Sheet<K>, opts: &CssOptions, css_href: &str) -> String {
    let base_class = opts.class_name.trim_start_matches('.');
    let mut html = String::new();
    let _ = writeln!(html, "<!DOCTYPE html>");
    let _ = writeln!(html, "<html>\n<head>\n<meta charset=\"utf-8\">");
    let _ = writeln!(html, "<link rel=\"stylesheet\" href=\"{}\">", escape_html(css_href));
    let _ = writeln!(
        html,
        "<style>{} {{display: inline-block; margin: 4px;}}</style>",
        opts.class_name
    );
    let _ = writeln!(html, "</head>\n<body>");
    for s in &sheet.sprites {
        let key = s.key.as_ref();
        let _ = writeln!(
            html,
            "<div class=\"{} {}\" title=\"{}\"></div>",
            escape_html(base_class),
            escape_html(&css_class_name(key)),
            escape_html(key)
        );
    }
    let _ = writeln!(html, "</body>\n</html>");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn class_name_is_stem_before_first_dot() {
        assert_eq!(css_class_name("icons/arrow.left.png"), "arrow");
        assert_eq!(css_class_name("C:\\art\\logo.gif"), "logo");
        assert_eq!(css_class_name("plain"), "plain");
        assert_eq!(css_class_name("dir/.hidden"), "sprite");
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
    }
}
