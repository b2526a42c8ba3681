//! RTF serializer: word-processor-compatible rich text with bold labels,
//! colored condition badges and explicit-codepoint escapes for everything
//! past ASCII.

use super::{BadgeTier, Report, ReportNode, ReportValue};

// Color table indices. 1: black, 2: dark gray, 3: gray, 4: accent blue,
// 5: green (good tier), 6: amber (moderate), 7: red (poor tier).
const HEADER: &str = "{\\rtf1\\ansi\\deff0\n\
{\\colortbl;\\red0\\green0\\blue0;\\red51\\green51\\blue51;\\red102\\green102\\blue102;\\red33\\green150\\blue243;\\red76\\green175\\blue80;\\red255\\green152\\blue0;\\red244\\green67\\blue54;}\n\
{\\fonttbl{\\f0\\fswiss\\fcharset0 Arial;}{\\f1\\fmodern\\fcharset0 Courier New;}}\n";

fn tier_color(tier: BadgeTier) -> &'static str {
    match tier {
        BadgeTier::Excellent | BadgeTier::Good => "\\cf5 ",
        BadgeTier::Moderate => "\\cf6 ",
        BadgeTier::Poor | BadgeTier::Ruined => "\\cf7 ",
        BadgeTier::Unknown => "\\cf0 ",
    }
}

pub(super) fn render(report: &Report) -> String {
    let mut out = String::from(HEADER);
    for node in &report.nodes {
        match node {
            ReportNode::Heading { level: 1, text } => {
                out.push_str("\\pard\\sb200\\sa200\\b\\fs32\\cf4 ");
                out.push_str(&escape(text));
                out.push_str("\\b0\\fs24\\par\n");
            }
            ReportNode::Heading { level: 2, text } => {
                out.push_str("\\pard\\sb150\\sa50\\b\\fs24\\cf1 ");
                out.push_str(&escape(text));
                out.push_str("\\b0\\par\n");
            }
            ReportNode::Heading { text, .. } => {
                out.push_str("\\pard\\sb100\\sa50\\li200\\b\\fs20\\cf1 ");
                out.push_str(&escape(text));
                out.push_str("\\b0\\par\n");
            }
            ReportNode::CountLine { count, label } => {
                out.push_str("\\pard\\sb100\\sa100\\fs20\\cf2 ");
                out.push_str(&escape(&format!("{count} {label}")));
                out.push_str("\\par\n");
            }
            ReportNode::Divider { heavy } => {
                if *heavy {
                    out.push_str("\\pard\\brdrt\\brdrs\\brdrw10\\brsp20\\par\n");
                } else {
                    out.push_str("\\pard\\brdrt\\brdrs\\brdrw5\\brsp10\\par\n");
                }
            }
            ReportNode::Table(rows) => {
                for row in rows {
                    match &row.value {
                        ReportValue::Text(v) => {
                            out.push_str("\\pard\\sb50\\sa50\\li200\\b\\fs20\\cf2 ");
                            out.push_str(&escape(&row.label));
                            out.push_str(":\\b0  \\cf0 ");
                            out.push_str(&escape(v));
                            out.push_str("\\par\n");
                        }
                        ReportValue::Badge { text, tier } => {
                            out.push_str("\\pard\\sb50\\sa50\\li200\\b\\fs20\\cf2 ");
                            out.push_str(&escape(&row.label));
                            out.push_str(":\\b0  ");
                            out.push_str(tier_color(*tier));
                            out.push_str(&escape(text));
                            out.push_str("\\cf0\\par\n");
                        }
                        ReportValue::Pre(v) => {
                            out.push_str("\\pard\\sb50\\sa50\\li200\\b\\fs20\\cf2 ");
                            out.push_str(&escape(&row.label));
                            out.push_str(":\\b0\\par\n");
                            out.push_str("\\pard\\sb20\\sa20\\li400\\f1\\fs18\\cf3 ");
                            out.push_str(&escape(v));
                            out.push_str("\\f0\\fs20\\cf0\\par\n");
                        }
                    }
                }
            }
        }
    }
    out.push('}');
    out
}

/// Escape control words, braces and newlines; everything past ASCII is
/// emitted as explicit `\uN?` sequences. `\u` takes a signed 16-bit value,
/// so each UTF-16 unit is reinterpreted as `i16` (units past 32767 come out
/// negative, and non-BMP characters become two surrogate escapes).
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut units = [0u16; 2];
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\n' => out.push_str("\\par\n"),
            '\r' => {}
            c if (c as u32) > 127 => {
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
            c => out.push(c),
        }
    }
    out
}
