use crate::error::Error;

/// Strip comments and whitespace from raw configuration text.
///
/// Returns the trimmed, non-empty lines in their original order. Everything
/// from the first unescaped `#` to the end of a line is discarded. Performs
/// no structural validation.
pub fn normalize(text: &str) -> Result<Vec<String>, Error> {
	let mut lines = Vec::new();
	for raw in text.lines() {
		let line = strip_comment(raw).trim();
		if !line.is_empty() {
			lines.push(line.to_owned());
		}
	}
	if lines.is_empty() {
		return Err(Error::EmptyDocument);
	}
	Ok(lines)
}

fn strip_comment(line: &str) -> &str {
	let mut prev = '\0';
	for (idx, ch) in line.char_indices() {
		if ch == '#' && prev != '\\' {
			return &line[..idx];
		}
		prev = ch;
	}
	line
}
