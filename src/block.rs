use crate::error::Error;

/// Read position over a normalized line sequence.
///
/// Parsers advance the cursor as they consume lines; consumed lines are never
/// re-read. The underlying sequence is immutable, so nested parse calls
/// cannot alias each other's input.
pub struct Cursor<'a> {
	lines: &'a [String],
	pos: usize,
}

impl<'a> Cursor<'a> {
	pub fn new(lines: &'a [String]) -> Self {
		Cursor { lines, pos: 0 }
	}

	pub fn next(&mut self) -> Option<&'a str> {
		let line = self.lines.get(self.pos)?;
		self.pos += 1;
		Some(line.as_str())
	}

	pub fn peek(&self) -> Option<&'a str> {
		self.lines.get(self.pos).map(String::as_str)
	}

	pub fn is_empty(&self) -> bool {
		self.pos >= self.lines.len()
	}
}

/// Parse `keyword { ... }` at the cursor, returning the content entries.
pub fn parse_unnamed_block(cursor: &mut Cursor, keyword: &str) -> Result<Vec<String>, Error> {
	let header = match cursor.next() {
		Some(x) => x,
		None => return Err(Error::malformed(format!("expected '{}' block", keyword))),
	};
	let tokens = header.split_whitespace().collect::<Vec<&str>>();
	if tokens.first() != Some(&keyword) {
		return Err(Error::malformed(format!("expected '{}', found '{}'", keyword, header)));
	}
	parse_block_body(cursor, &tokens[1..], keyword)
}

/// Parse `keyword name { ... }` at the cursor, returning the name and the
/// content entries. The name must match `^[\w-]+$`.
pub fn parse_named_block(cursor: &mut Cursor, keyword: &str) -> Result<(String, Vec<String>), Error> {
	let header = match cursor.next() {
		Some(x) => x,
		None => return Err(Error::malformed(format!("expected '{}' block", keyword))),
	};
	let tokens = header.split_whitespace().collect::<Vec<&str>>();
	if tokens.first() != Some(&keyword) {
		return Err(Error::malformed(format!("expected '{}', found '{}'", keyword, header)));
	}
	let name = match tokens.get(1) {
		Some(x) if is_valid_name(x) => x.to_string(),
		Some(x) => return Err(Error::malformed(format!("invalid {} name '{}'", keyword, x))),
		None => return Err(Error::malformed(format!("expected a name after '{}'", keyword))),
	};
	let content = parse_block_body(cursor, &tokens[2..], keyword)?;
	Ok((name, content))
}

/// Brace and content handling shared by both block forms. `rest` holds the
/// header tokens after the keyword (and name, if any).
///
/// Accepted shapes:
///   `kw {` + lines + `}`      multi-line, one entry per line, verbatim
///   `kw` / `{` on next line   as above
///   `kw {}`                   empty block
///   `kw { a b }`              inline, one entry per token
fn parse_block_body(cursor: &mut Cursor, rest: &[&str], keyword: &str) -> Result<Vec<String>, Error> {
	let rest: Vec<&str> = if rest.is_empty() {
		match cursor.next() {
			Some(x) => x.split_whitespace().collect(),
			None => return Err(Error::malformed(format!("expected '{{' after '{}'", keyword))),
		}
	} else {
		rest.to_vec()
	};

	match rest.split_first() {
		Some((&"{}", [])) => Ok(Vec::new()),
		Some((&"{", tail)) => {
			if tail.is_empty() {
				let mut content = Vec::new();
				loop {
					match cursor.next() {
						None => return Err(Error::malformed(format!("missing closing '}}' in '{}' block", keyword))),
						Some("}") => return Ok(content),
						Some(line) => content.push(line.to_owned()),
					}
				}
			} else {
				match tail.split_last() {
					Some((&"}", inner)) => Ok(inner.iter().map(|x| x.to_string()).collect()),
					_ => Err(Error::malformed(format!("expected '}}' at end of '{}' block", keyword))),
				}
			}
		}
		_ => Err(Error::malformed(format!("expected '{{' after '{}'", keyword))),
	}
}

/// Parse an entity root declaration: `keyword name` followed by `{` here or
/// on the next line, or the inline-empty forms `keyword name {}` and
/// `keyword name { }`.
///
/// Unlike the block forms above this consumes only the header; the entity
/// parsers read the flat property sequence themselves, since a property block
/// ends with the same `}` that would otherwise terminate the root early.
/// Returns the entity name and whether the declaration was inline-empty.
pub fn parse_root_decl(cursor: &mut Cursor, keyword: &str) -> Result<(String, bool), Error> {
	let header = match cursor.next() {
		Some(x) => x,
		None => return Err(Error::malformed(format!("expected '{}' declaration", keyword))),
	};
	let tokens = header.split_whitespace().collect::<Vec<&str>>();
	if tokens.first() != Some(&keyword) {
		return Err(Error::malformed(format!("expected '{}', found '{}'", keyword, header)));
	}
	let name = match tokens.get(1) {
		Some(x) if is_valid_name(x) => x.to_string(),
		Some(x) => return Err(Error::malformed(format!("invalid {} name '{}'", keyword, x))),
		None => return Err(Error::malformed(format!("expected a name after '{}'", keyword))),
	};
	match &tokens[2..] {
		[] => match cursor.next() {
			Some("{") => Ok((name, false)),
			_ => Err(Error::malformed(format!("expected '{{' after {} declaration", keyword))),
		},
		["{"] => Ok((name, false)),
		["{}"] | ["{", "}"] => Ok((name, true)),
		_ => Err(Error::malformed(format!("invalid {} declaration '{}'", keyword, header))),
	}
}

fn is_valid_name(name: &str) -> bool {
	!name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
