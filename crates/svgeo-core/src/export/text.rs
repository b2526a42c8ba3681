//! Plain-text report serializer: linearized key/value dump with simple
//! delimiters, suitable for any text field.

use super::{Report, ReportNode, ReportValue};

pub(super) fn render(report: &Report) -> String {
    let mut out = String::new();
    for node in &report.nodes {
        match node {
            ReportNode::Heading { level: 1, text } => {
                out.push_str(text);
                out.push('\n');
                out.push_str(&"=".repeat(text.chars().count()));
                out.push_str("\n\n");
            }
            ReportNode::Heading { text, .. } => {
                out.push_str(text);
                out.push_str(":\n");
                out.push_str(&"-".repeat(30));
                out.push('\n');
            }
            ReportNode::CountLine { count, label } => {
                out.push_str(&format!("{count} {label}\n"));
            }
            ReportNode::Divider { heavy } => {
                let rule = if *heavy { "=" } else { "-" };
                out.push('\n');
                out.push_str(&rule.repeat(60));
                out.push_str("\n\n");
            }
            ReportNode::Table(rows) => {
                for row in rows {
                    match &row.value {
                        ReportValue::Text(v) | ReportValue::Badge { text: v, .. } => {
                            out.push_str(&format!("{}: {v}\n", row.label));
                        }
                        ReportValue::Pre(v) => {
                            out.push_str(&format!("{}:\n{v}\n", row.label));
                        }
                    }
                }
                out.push('\n');
            }
        }
    }
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}
