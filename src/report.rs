//! Built-in generation rule programs, writing the finalized dependency list as `licenses.xml`
//!  and `licenses.html`.

pub mod html;
pub mod xml;

use std::path::Path;

use crate::error::{AuditError, AuditResult};

pub use html::HtmlReportGenerator;
pub use xml::XmlReportGenerator;

/// Escapes text for use in XML / HTML content and attribute values
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            _ => result.push(ch),
        }
    }
    result
}

pub(crate) fn write_report(path: &Path, content: &str) -> AuditResult<()> {
    let to_error = |source| AuditError::Report { path: path.to_path_buf(), source };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(to_error)?;
    }
    std::fs::write(path, content).map_err(to_error)
}
