//! Minimal CSV encoding (RFC 4180 quoting).

/// Quote a field if it contains a delimiter, quote or line break
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Encode one row, newline-terminated
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = fields
        .into_iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

/// Encode a header row followed by data rows
pub fn encode_table<R, S>(header: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<S>>,
    S: AsRef<str>,
{
    let mut out = encode_row(header.iter().copied());
    for row in rows {
        out.push_str(&encode_row(row));
    }
    out
}
