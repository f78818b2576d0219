//! Command parser
//!
//! Turns a raw command line into a [`Command`]. Never fails: malformed
//! operands come back as `None` / empty lists.
//!
//! ## Grammar
//! ```text
//! line   := ws* keyword (ws+ operand)?
//! group  := '{' body '}'          body is one or more chars, none of them '}'
//! body   := pair (',' pair)* ','*
//! pair   := ws* key ws* ':' ws* value ws*
//! ```
//! `key` and `value` must be non-empty after trimming; `value` runs to the
//! end of the pair and may contain further `:`. Text outside groups is
//! ignored. A single bad pair invalidates its whole group.

use crate::document::Fields;

use super::{Command, CommandType};

/// Parse a full command line
pub fn parse_command(line: &str) -> Command {
    let (keyword, operand) = split_operation(line);

    let command = match CommandType::from_keyword(keyword) {
        Some(CommandType::InsertOne) => Command::InsertOne {
            document: parse_document(operand),
        },
        Some(CommandType::InsertMany) => Command::InsertMany {
            documents: parse_documents(operand),
        },
        Some(CommandType::Find) => Command::Find {
            criteria: parse_document(operand),
        },
        Some(CommandType::Delete) => Command::Delete {
            criteria: parse_document(operand),
        },
        Some(CommandType::Stop) => Command::Stop,
        Some(CommandType::PurgeAndStop) => Command::PurgeAndStop,
        None => Command::Unknown {
            operation: keyword.to_string(),
        },
    };

    tracing::trace!("Parsed {:?} from {:?}", command, line);
    command
}

/// Split a line into its operation keyword and operand text
///
/// The operand is everything after the first whitespace run; it is empty if
/// the line holds only a keyword.
pub fn split_operation(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.find(char::is_whitespace) {
        Some(end) => (&line[..end], line[end..].trim_start()),
        None => (line, ""),
    }
}

/// Parse the first document group in `operand`
///
/// `None` if there is no group, or the first group is malformed.
pub fn parse_document(operand: &str) -> Option<Fields> {
    let body = Groups::new(operand).next()?;
    parse_body(body)
}

/// Parse every document group in `operand`, dropping malformed ones
pub fn parse_documents(operand: &str) -> Vec<Fields> {
    Groups::new(operand)
        .filter_map(|body| {
            let parsed = parse_body(body);
            if parsed.is_none() {
                tracing::trace!("Dropping malformed group {{{}}}", body);
            }
            parsed
        })
        .collect()
}

/// Iterator over the bodies of `{...}` groups, left to right
struct Groups<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Groups<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }
}

impl<'a> Iterator for Groups<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let open = self.pos + self.input[self.pos..].find('{')?;
            let body_start = open + 1;

            // No closing brace anywhere ahead means no further groups at all
            let body_len = self.input[body_start..].find('}')?;

            if body_len == 0 {
                // `{}` is not a group; keep scanning after it
                self.pos = body_start;
                continue;
            }

            self.pos = body_start + body_len + 1;
            return Some(&self.input[body_start..body_start + body_len]);
        }
    }
}

/// Parse a group body into fields; any bad pair rejects the whole body
fn parse_body(body: &str) -> Option<Fields> {
    let mut segments: Vec<&str> = body.split(',').collect();

    // Trailing separators are tolerated: `{a:1,}`
    while segments.last() == Some(&"") {
        segments.pop();
    }

    let mut fields = Fields::new();
    for segment in segments {
        let (key, value) = parse_pair(segment)?;
        fields.insert(key, value);
    }
    Some(fields)
}

/// `key:value`, split on the first colon, both sides non-empty after trim
fn parse_pair(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.trim().split_once(':')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}
