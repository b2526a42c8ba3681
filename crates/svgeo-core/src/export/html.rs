//! Styled-markup serializer: a self-contained HTML document with the Office
//! namespaces and inline styles Word needs to keep the formatting on paste.

use super::{Report, ReportNode, ReportValue};

const STYLE: &str = concat!(
    "body { font-family: Calibri, Arial, sans-serif; font-size: 11pt; line-height: 1.5; margin: 20px; }",
    "h1 { font-size: 18pt; font-weight: bold; color: #2E75B6; margin: 16pt 0 12pt 0; border-bottom: 2pt solid #2E75B6; padding-bottom: 4pt; }",
    "h2 { font-size: 14pt; font-weight: bold; color: #1F4E78; margin: 12pt 0 8pt 0; }",
    "h3 { font-size: 12pt; font-weight: bold; color: #2E75B6; margin: 10pt 0 6pt 0; }",
    "p.count { text-align: center; color: #666; font-size: 10pt; margin: 8pt 0; }",
    "hr { border: none; border-top: 1pt dashed #CCC; margin: 16pt 0; }",
    "hr.thick { border-top: 2pt solid #2E75B6; margin: 20pt 0; }",
    "table { border-collapse: collapse; width: 100%; margin: 8pt 0; }",
    "td { padding: 4pt 8pt; vertical-align: top; }",
    "td.label { font-weight: bold; color: #555; width: 35%; background-color: #F2F2F2; }",
    "td.value { color: #333; width: 65%; }",
    ".badge { padding: 2pt 6pt; border-radius: 3pt; font-size: 9pt; font-weight: bold; white-space: nowrap; }",
    ".badge-excellent { background-color: #4CAF50; color: white; }",
    ".badge-good { background-color: #8BC34A; color: white; }",
    ".badge-moderate { background-color: #FFC107; color: #333; }",
    ".badge-poor { background-color: #FF9800; color: white; }",
    ".badge-ruined { background-color: #F44336; color: white; }",
    ".badge-unknown { background-color: #E2E3E5; color: #383D41; }",
    "pre { background: #F8F8F8; padding: 8pt; border: 1pt solid #DDD; border-radius: 3pt; font-family: Consolas, monospace; font-size: 9pt; }",
);

pub(super) fn render(report: &Report, custom_css: &str) -> String {
    let mut out = String::from(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">",
    );
    out.push_str("<head><meta charset=\"utf-8\"><meta name=\"Generator\" content=\"SVGEO Viewer\">");
    out.push_str("<style>");
    out.push_str(STYLE);
    out.push_str(custom_css);
    out.push_str("</style></head><body>");

    for node in &report.nodes {
        match node {
            ReportNode::Heading { level, text } => {
                let tag = match level {
                    1 => "h1",
                    2 => "h2",
                    _ => "h3",
                };
                out.push_str(&format!("<{tag}>{}</{tag}>", escape(text)));
            }
            ReportNode::CountLine { count, label } => {
                out.push_str(&format!("<p class=\"count\">{count} {}</p>", escape(label)));
            }
            ReportNode::Divider { heavy } => {
                out.push_str(if *heavy { "<hr class=\"thick\">" } else { "<hr>" });
            }
            ReportNode::Table(rows) => {
                out.push_str("<table>");
                for row in rows {
                    let label = escape(&row.label);
                    match &row.value {
                        ReportValue::Text(v) => {
                            out.push_str(&format!(
                                "<tr><td class=\"label\">{label}:</td><td class=\"value\">{}</td></tr>",
                                escape(v)
                            ));
                        }
                        ReportValue::Badge { text, tier } => {
                            out.push_str(&format!(
                                "<tr><td class=\"label\">{label}:</td><td class=\"value\">\
                                 <span class=\"badge {}\">{}</span></td></tr>",
                                tier.css_class(),
                                escape(text)
                            ));
                        }
                        ReportValue::Pre(v) => {
                            out.push_str(&format!(
                                "<tr><td class=\"label\" colspan=\"2\">{label}:</td></tr>\
                                 <tr><td colspan=\"2\"><pre>{}</pre></td></tr>",
                                escape(v)
                            ));
                        }
                    }
                }
                out.push_str("</table>");
            }
        }
    }

    out.push_str("</body></html>");
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::escape;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_badge_markup() {
        let report = Report {
            nodes: vec![ReportNode::Table(vec![ReportRow {
                label: "Condition".to_string(),
                value: ReportValue::Badge {
                    text: "Good".to_string(),
                    tier: BadgeTier::Good,
                },
            }])],
        };
        let html = report.to_html("");
        assert!(html.contains("<span class=\"badge badge-good\">Good</span>"));
    }

    #[test]
    fn test_custom_css_is_appended() {
        let report = Report::default();
        let html = report.to_html("h1 { color: red; }");
        assert!(html.contains("h1 { color: red; }</style>"));
    }

    #[test]
    fn test_word_namespaces_present() {
        let html = Report::default().to_html("");
        assert!(html.contains("urn:schemas-microsoft-com:office:word"));
    }
}
