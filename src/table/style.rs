use scraper::ElementRef;

const BORDER_STYLES: [&str; 10] = [
    "none", "hidden", "dotted", "dashed", "solid", "double", "groove", "ridge", "inset", "outset",
];

/// Resolved top and bottom border styles of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BorderStyles {
    pub top: Option<String>,
    pub bottom: Option<String>,
}

impl BorderStyles {
    /// Resolve from an inline `style` attribute. Later declarations win.
    pub fn from_style(style: &str) -> Self {
        let mut borders = BorderStyles::default();
        for (property, value) in declarations(style) {
            match property.as_str() {
                "border-top-style" => borders.top = Some(value),
                "border-bottom-style" => borders.bottom = Some(value),
                "border-top" => {
                    if let Some(s) = shorthand_style(&value) {
                        borders.top = Some(s);
                    }
                }
                "border-bottom" => {
                    if let Some(s) = shorthand_style(&value) {
                        borders.bottom = Some(s);
                    }
                }
                "border" => {
                    if let Some(s) = shorthand_style(&value) {
                        borders.top = Some(s.clone());
                        borders.bottom = Some(s);
                    }
                }
                "border-style" => {
                    // top [right [bottom [left]]]
                    let parts: Vec<&str> = value.split_whitespace().collect();
                    if let Some(top) = parts.first() {
                        borders.top = Some(top.to_string());
                        borders.bottom = Some(parts.get(2).unwrap_or(top).to_string());
                    }
                }
                _ => {}
            }
        }
        borders
    }

    pub fn from_element(element: ElementRef<'_>) -> Self {
        element
            .value()
            .attr("style")
            .map(Self::from_style)
            .unwrap_or_default()
    }
}

/// Whether a border style draws a line in the exported sheet.
pub fn is_ruled(style: Option<&str>) -> bool {
    style.is_some_and(|s| s.contains("solid") || s.contains("double"))
}

/// An element is displayed unless it or an ancestor is hidden.
pub fn is_displayed(element: ElementRef<'_>) -> bool {
    std::iter::once(element)
        .chain(element.ancestors().filter_map(ElementRef::wrap))
        .all(|e| !is_hidden(e))
}

fn is_hidden(element: ElementRef<'_>) -> bool {
    let value = element.value();
    if value.attr("hidden").is_some() {
        return true;
    }
    value.attr("style").is_some_and(|style| {
        declarations(style)
            .any(|(property, value)| property == "display" && value.starts_with("none"))
    })
}

fn declarations(style: &str) -> impl Iterator<Item = (String, String)> + '_ {
    style.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        Some((
            property.trim().to_ascii_lowercase(),
            value.trim().to_ascii_lowercase(),
        ))
    })
}

fn shorthand_style(value: &str) -> Option<String> {
    value
        .split_whitespace()
        .find(|token| BORDER_STYLES.contains(token))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_border_longhand_and_shorthand() {
        let b = BorderStyles::from_style("border-bottom: 1px solid #000; border-top-style: double");
        assert_eq!(b.top.as_deref(), Some("double"));
        assert_eq!(b.bottom.as_deref(), Some("solid"));

        let b = BorderStyles::from_style("border: 2px DOTTED black");
        assert_eq!(b.top.as_deref(), Some("dotted"));
        assert_eq!(b.bottom.as_deref(), Some("dotted"));

        let b = BorderStyles::from_style("border-style: solid none double none");
        assert_eq!(b.top.as_deref(), Some("solid"));
        assert_eq!(b.bottom.as_deref(), Some("double"));

        let b = BorderStyles::from_style("border-style: solid; border-bottom: none");
        assert_eq!(b.top.as_deref(), Some("solid"));
        assert_eq!(b.bottom.as_deref(), Some("none"));

        assert_eq!(BorderStyles::from_style("color: red"), BorderStyles::default());
    }

    #[test]
    fn test_is_ruled() {
        assert!(is_ruled(Some("solid")));
        assert!(is_ruled(Some("double")));
        assert!(!is_ruled(Some("dashed")));
        assert!(!is_ruled(Some("none")));
        assert!(!is_ruled(None));
    }

    #[test]
    fn test_is_displayed() {
        let html = Html::parse_fragment(
            r#"<table><tr><td id="a">1</td><td id="b" style="display: none">2</td><td id="c" hidden>3</td></tr>
            <tr style="DISPLAY:NONE"><td id="d">4</td></tr></table>"#,
        );
        let displayed: Vec<&str> = html
            .select(&Selector::parse("td").unwrap())
            .filter(|td| is_displayed(*td))
            .filter_map(|td| td.value().attr("id"))
            .collect();
        assert_eq!(displayed, vec!["a"]);
    }
}
