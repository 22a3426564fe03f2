//! Stylesheet loading
//! Reads the dashboard CSS file and applies the declarations egui understands.

use egui::{Color32, TextStyle};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StyleError {
    #[error("Stylesheet {path} not found: {source}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single `property: value` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub selector: String,
    pub property: String,
    pub value: String,
}

/// Stylesheet text plus its parsed declarations, in source order.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    pub source: String,
    pub declarations: Vec<Declaration>,
}

impl Stylesheet {
    pub fn load(path: &Path) -> Result<Self, StyleError> {
        let source = std::fs::read_to_string(path).map_err(|source| StyleError::Missing {
            path: path.to_path_buf(),
            source,
        })?;
        let sheet = Self::parse(&source);
        info!(
            path = %path.display(),
            bytes = sheet.source.len(),
            declarations = sheet.declarations.len(),
            "loaded stylesheet"
        );
        Ok(sheet)
    }

    pub fn parse(source: &str) -> Self {
        let stripped = strip_comments(source);
        let mut declarations = Vec::new();

        for block in stripped.split('}') {
            let Some((selector, body)) = block.split_once('{') else {
                continue;
            };
            let selector = selector.trim();
            for decl in body.split(';') {
                if let Some((property, value)) = decl.split_once(':') {
                    let property = property.trim().to_lowercase();
                    let value = value.trim().trim_end_matches("!important").trim();
                    if !property.is_empty() && !value.is_empty() {
                        declarations.push(Declaration {
                            selector: selector.to_string(),
                            property,
                            value: value.to_string(),
                        });
                    }
                }
            }
        }

        Self {
            source: source.to_string(),
            declarations,
        }
    }

    /// Push the supported declarations into the egui style. Later rules win.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        for decl in &self.declarations {
            match decl.property.as_str() {
                "background-color" | "background" => match parse_color(&decl.value) {
                    Some(color) => {
                        style.visuals.panel_fill = color;
                        style.visuals.window_fill = color;
                    }
                    None => debug!(value = %decl.value, "unsupported background value"),
                },
                "color" => match parse_color(&decl.value) {
                    Some(color) => style.visuals.override_text_color = Some(color),
                    None => debug!(value = %decl.value, "unsupported color value"),
                },
                "font-size" => match parse_px(&decl.value) {
                    Some(size) => {
                        if let Some(font) = style.text_styles.get_mut(&TextStyle::Body) {
                            font.size = size;
                        }
                    }
                    None => debug!(value = %decl.value, "unsupported font-size value"),
                },
                other => debug!(selector = %decl.selector, property = other, "ignoring css property"),
            }
        }

        ctx.set_style(style);
    }
}

fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        rest = match rest[start + 2..].find("*/") {
            Some(end) => &rest[start + 2 + end + 2..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

/// `#rgb`, `#rrggbb` or `rgb(r, g, b)`.
pub fn parse_color(value: &str) -> Option<Color32> {
    let value = value.trim();

    if let Some(hex) = value.strip_prefix('#') {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        return match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                Some(Color32::from_rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Some(Color32::from_rgb(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => None,
        };
    }

    let inner = value.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<u8> = inner
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color32::from_rgb(*r, *g, *b)),
        _ => None,
    }
}

fn parse_px(value: &str) -> Option<f32> {
    value.trim().strip_suffix("px")?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = r#"
        /* page */
        .main { background-color: #0e1117; color: rgb(250, 250, 250); }
        h1 { font-size: 18px !important; margin: 0 }
        .empty { }
    "#;

    #[test]
    fn test_parse_declarations() {
        let sheet = Stylesheet::parse(SHEET);
        let props: Vec<&str> = sheet
            .declarations
            .iter()
            .map(|d| d.property.as_str())
            .collect();

        assert_eq!(props, vec!["background-color", "color", "font-size", "margin"]);
        assert_eq!(sheet.declarations[0].selector, ".main");
        assert_eq!(sheet.declarations[2].value, "18px");
        assert_eq!(sheet.source, SHEET);
    }

    #[test]
    fn test_strip_comments() {
        assert_eq!(strip_comments("a/* x */b/* unterminated"), "ab");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#fff"), Some(Color32::from_rgb(255, 255, 255)));
        assert_eq!(parse_color("#0e1117"), Some(Color32::from_rgb(14, 17, 23)));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color32::from_rgb(1, 2, 3)));
        assert_eq!(parse_color("tomato"), None);
        assert_eq!(parse_color("#12345"), None);
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("18px"), Some(18.0));
        assert_eq!(parse_px("1.5em"), None);
    }

    #[test]
    fn test_apply_updates_style() {
        let ctx = egui::Context::default();
        Stylesheet::parse(SHEET).apply(&ctx);

        let style = ctx.style();
        assert_eq!(style.visuals.panel_fill, Color32::from_rgb(14, 17, 23));
        assert_eq!(
            style.visuals.override_text_color,
            Some(Color32::from_rgb(250, 250, 250))
        );
        assert_eq!(style.text_styles[&TextStyle::Body].size, 18.0);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Stylesheet::load(Path::new("/definitely/not/here/index.css")).unwrap_err();
        assert!(matches!(err, StyleError::Missing { .. }));
    }
}
