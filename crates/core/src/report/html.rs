use crate::bc::incident::Incident;

use super::{group_by_type, sorted_by_element, ReportError, Reporter, NO_BREAKS_MESSAGE};

const PAGE_HEADER: &str = "<html>\n\
\t<head>\n\
\t\t<style type=\"text/css\">\n\
\t\t\tol.bc-report { font-family: monospace; }\n\
\t\t\tol.bc-report li { padding: 4px; margin-bottom: 8px; }\n\
\t\t\tol.bc-report li:nth-child(odd) { background-color: lightgray; }\n\
\t\t</style>\n\
\t</head>\n\
\t<body>\n\
\t\t<h1>Backward compatibility breaks:</h1>";

/// Standalone HTML page: one `<h2>` per incident type and an `<ol>` with a
/// list item per element. Elements and OLD/NEW values are escaped, so
/// by-reference signatures survive a browser unmangled.
pub struct HtmlReporter;

impl Reporter for HtmlReporter {
    fn name(&self) -> &str {
        "html"
    }

    fn generate(&self, incidents: &[Incident]) -> Result<String, ReportError> {
        if incidents.is_empty() {
            return Ok(format!("<h1>{NO_BREAKS_MESSAGE}</h1>"));
        }

        let mut out = String::from(PAGE_HEADER);
        for (incident_type, members) in group_by_type(incidents) {
            out.push('\n');
            out.push_str(&format!(
                "\t\t<h2>{} ({})</h2>\n",
                incident_type.humanized(),
                members.len()
            ));
            out.push_str("\t\t<ol class=\"bc-report\">\n");

            for incident in sorted_by_element(&members) {
                match (&incident.old, &incident.new) {
                    (Some(old), Some(new)) => {
                        out.push_str("\t\t\t<li>\n");
                        out.push_str(&format!(
                            "\t\t\t\t<strong>{}</strong><br/>\n",
                            escape(&incident.element)
                        ));
                        out.push_str(&format!("\t\t\t\tOLD: {}<br/>\n", escape(old)));
                        out.push_str(&format!("\t\t\t\tNEW: {}<br/>\n", escape(new)));
                        out.push_str("\t\t\t</li>\n");
                    }
                    _ => {
                        out.push_str(&format!("\t\t\t<li>{}</li>\n", escape(&incident.element)));
                    }
                }
            }
            out.push_str("\t\t</ol>");
        }
        out.push_str("\n\t</body>\n</html>\n");
        Ok(out)
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc::incident::IncidentType;

    #[test]
    fn empty_input_reports_no_breaks() {
        let report = HtmlReporter.generate(&[]).unwrap();
        assert_eq!(
            report,
            "<h1>No backwards compatibility breaks detected.</h1>"
        );
    }

    #[test]
    fn renders_one_list_per_type_with_escaped_entries() {
        let incidents = vec![
            Incident::new(IncidentType::ClassDeleted, "Cart"),
            Incident::with_change(
                IncidentType::MethodSignatureChanged,
                "Order::add",
                "&$item",
                "array $items",
            ),
        ];
        let report = HtmlReporter.generate(&incidents).unwrap();

        assert!(report.starts_with("<html>\n\t<head>"));
        assert!(report.contains("\t\t<h1>Backward compatibility breaks:</h1>\n"));
        assert!(report.contains("\t\t<h2>Class Deleted (1)</h2>\n"));
        assert!(report.contains("\t\t\t<li>Cart</li>\n"));
        assert!(report.contains("\t\t<h2>Method Signature Changed (1)</h2>\n"));
        assert!(report.contains("\t\t\t\t<strong>Order::add</strong><br/>\n"));
        assert!(report.contains("\t\t\t\tOLD: &amp;$item<br/>\n"));
        assert!(report.contains("\t\t\t\tNEW: array $items<br/>\n"));
        assert!(report.ends_with("\t\t</ol>\n\t</body>\n</html>\n"));
    }

    #[test]
    fn groups_keep_first_appearance_order() {
        let incidents = vec![
            Incident::new(IncidentType::FunctionDeleted, "render"),
            Incident::new(IncidentType::ConstantDeleted, "LIMIT"),
            Incident::new(IncidentType::FunctionDeleted, "draw"),
        ];
        let report = HtmlReporter.generate(&incidents).unwrap();
        let functions = report.find("<h2>Function Deleted (2)</h2>").unwrap();
        let constants = report.find("<h2>Constant Deleted (1)</h2>").unwrap();
        assert!(functions < constants);
        // Within a group the entries are element-sorted.
        assert!(report.find("<li>draw</li>").unwrap() < report.find("<li>render</li>").unwrap());
    }
}
