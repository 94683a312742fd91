//! CSV formatting for registration exports.
//!
//! Output is RFC 4180: CRLF row terminators, fields quoted only when they
//! contain a comma, quote, or line break, quotes doubled. A UTF-8 BOM is
//! prepended so spreadsheet tools detect the encoding.

/// UTF-8 byte order mark expected by Excel.
pub const UTF8_BOM: &str = "\u{feff}";

/// Quote a single field if it contains a delimiter, quote, or line break.
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Render a header row plus data rows into a BOM-prefixed CSV document.
pub fn build_csv(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::from(UTF8_BOM);
    push_row(&mut out, headers.iter().copied());
    for row in rows {
        push_row(&mut out, row.iter().map(String::as_str));
    }
    out
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}
