//! Embed code generation
//!
//! Pure string templating: the same inputs always produce the same markup.

use serde::Serialize;

pub const IFRAME_WIDTH: &str = "100%";
pub const IFRAME_HEIGHT: u32 = 600;

/// Path of the embed view that renders stored configurations by id
pub const DYNAMIC_FORM_PATH: &str = "/embed/dynamic-form";

/// Shortcode name for a path with no segments. Contains `/`, so no real
/// segment can produce it.
pub const ROOT_SHORTCODE: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedCode {
    pub iframe: String,
    pub shortcode: String,
}

/// Both embed variants for one target
pub fn generate(base_url: &str, embed_path: &str, config_id: Option<&str>) -> EmbedCode {
    EmbedCode {
        iframe: iframe_code(base_url, embed_path, config_id),
        shortcode: shortcode(embed_path, config_id),
    }
}

/// Absolute URL of the embed view, with `?id=` when a configuration is named
pub fn embed_url(base_url: &str, embed_path: &str, config_id: Option<&str>) -> String {
    let base = base_url.trim_end_matches('/');
    let path = if embed_path.starts_with('/') {
        embed_path.to_string()
    } else {
        format!("/{}", embed_path)
    };

    match config_id {
        Some(id) => {
            let separator = if path.contains('?') { '&' } else { '?' };
            format!("{}{}{}id={}", base, path, separator, urlencoding::encode(id))
        }
        None => format!("{}{}", base, path),
    }
}

/// Escape a value for use inside a double-quoted attribute
fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn iframe_code(base_url: &str, embed_path: &str, config_id: Option<&str>) -> String {
    format!(
        "<iframe\n  src=\"{}\"\n  width=\"{}\"\n  height=\"{}\"\n  style=\"border:none; border-radius:8px;\"\n  frameborder=\"0\">\n</iframe>",
        escape_attr(&embed_url(base_url, embed_path, config_id)),
        IFRAME_WIDTH,
        IFRAME_HEIGHT
    )
}

/// Tag name derived from the embed path: its last segment, so paths ending
/// in different segments never share a name.
pub fn shortcode_name(embed_path: &str) -> String {
    let path = embed_path.split('?').next().unwrap_or_default();
    let segment = path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();

    if segment.is_empty() {
        ROOT_SHORTCODE.to_string()
    } else {
        segment.to_string()
    }
}

pub fn shortcode(embed_path: &str, config_id: Option<&str>) -> String {
    let name = shortcode_name(embed_path);
    match config_id {
        Some(id) => format!(
            "[{} id=\"{}\" width=\"{}\" height=\"{}\"]",
            name,
            escape_attr(id),
            IFRAME_WIDTH,
            IFRAME_HEIGHT
        ),
        None => format!("[{} width=\"{}\" height=\"{}\"]", name, IFRAME_WIDTH, IFRAME_HEIGHT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_path_shortcode() {
        assert_eq!(
            shortcode("/embed/phone-lead", None),
            r#"[phone-lead width="100%" height="600"]"#
        );
    }

    #[test]
    fn test_dynamic_form_shortcode_carries_id() {
        assert_eq!(
            shortcode(DYNAMIC_FORM_PATH, Some("abc-123")),
            r#"[dynamic-form id="abc-123" width="100%" height="600"]"#
        );
    }

    #[test]
    fn test_distinct_segments_give_distinct_names() {
        let a = shortcode_name("/embed/phone-lead");
        let b = shortcode_name("/embed/property-estimator");
        let c = shortcode_name("/embed/phone-lead/");
        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_lookalike_segments_do_not_collide() {
        let pairs = [
            ("/embed/dynamic-form", "/embed/dynamic_form"),
            ("/", "/embed/form"),
            ("", "/embed/root"),
            ("/embed/", "/embed/embed-root"),
        ];
        for (a, b) in pairs {
            assert_ne!(shortcode(a, None), shortcode(b, None), "{} vs {}", a, b);
        }
        assert_eq!(shortcode_name("/embed/dynamic-form?id=x"), "dynamic-form");
    }

    #[test]
    fn test_attribute_values_are_escaped() {
        let code = iframe_code("https://forms.example.com/\"><script>", "/embed/phone-lead", None);
        assert!(code.contains("src=\"https://forms.example.com/&quot;&gt;&lt;script&gt;/embed/phone-lead\""));
        assert!(!code.contains("<script>"));

        let code = iframe_code("http://localhost:3000", "/embed/x?theme=dark", Some("abc"));
        assert!(code.contains("src=\"http://localhost:3000/embed/x?theme=dark&amp;id=abc\""));

        assert_eq!(
            shortcode(DYNAMIC_FORM_PATH, Some("a\"b")),
            r#"[dynamic-form id="a&quot;b" width="100%" height="600"]"#
        );
    }

    #[test]
    fn test_iframe_snapshot() {
        let code = iframe_code("https://forms.example.com/", DYNAMIC_FORM_PATH, Some("abc-123"));
        assert_eq!(
            code,
            "<iframe\n  src=\"https://forms.example.com/embed/dynamic-form?id=abc-123\"\n  width=\"100%\"\n  height=\"600\"\n  style=\"border:none; border-radius:8px;\"\n  frameborder=\"0\">\n</iframe>"
        );
        assert_eq!(code, iframe_code("https://forms.example.com/", DYNAMIC_FORM_PATH, Some("abc-123")));
    }

    #[test]
    fn test_embed_url_variants() {
        assert_eq!(
            embed_url("http://localhost:3000", "embed/phone-lead", None),
            "http://localhost:3000/embed/phone-lead"
        );
        assert_eq!(
            embed_url("http://localhost:3000", "/embed/x?theme=dark", Some("a b")),
            "http://localhost:3000/embed/x?theme=dark&id=a%20b"
        );
    }
}
