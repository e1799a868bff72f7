/// Parses task documents made of titled sections with `key: value, value` pairs:
/// ```text
/// // comment
/// grid
///   num_cells: 99
/// physics
///   alpha: 0.01
///   boundary: fixed, 0.0, 100.0
/// ```
/// Titles and keys are identifiers, values are separated by commas and typed on the fly
/// (integer, float, boolean, otherwise string). Section and entry order is preserved.
use crate::numerical::Heat1D::heat_errors::{HeatError, HeatResult};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::fmt::Display;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    fn from_token(token: &str) -> Value {
        if let Ok(val) = token.parse::<i64>() {
            Value::Integer(val)
        } else if let Ok(val) = token.parse::<f64>() {
            Value::Float(val)
        } else if let Ok(val) = token.parse::<bool>() {
            Value::Boolean(val)
        } else {
            Value::String(token.to_string())
        }
    }

    /// numeric value, integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskSection {
    pub title: String,
    pub entries: Vec<(String, Vec<Value>)>,
}

impl TaskSection {
    pub fn get(&self, key: &str) -> Option<&[Value]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskDocument {
    pub sections: Vec<TaskSection>,
}

impl TaskDocument {
    pub fn section(&self, title: &str) -> Option<&TaskSection> {
        self.sections.iter().find(|s| s.title == title)
    }
}

/// identifier: letter or underscore followed by letters, digits, underscores
pub(crate) fn parse_identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0(alt((alphanumeric1, tag("_")))),
        )),
        String::from,
    )
    .parse(input)
}

pub(crate) fn parse_value(input: &str) -> IResult<&str, Value> {
    map(
        take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';')),
        Value::from_token,
    )
    .parse(input)
}

/// at least one value; the list never continues onto the next line
pub(crate) fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    separated_list1(delimited(space0, tag(","), space0), parse_value).parse(input)
}

pub(crate) fn parse_entry(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    terminated(
        separated_pair(
            parse_identifier,
            delimited(space0, tag(":"), space0),
            parse_value_list,
        ),
        multispace0,
    )
    .parse(input)
}

pub(crate) fn parse_section(input: &str) -> IResult<&str, TaskSection> {
    let (input, title) = delimited(multispace0, parse_identifier, multispace0).parse(input)?;
    let (input, entries) = many1(parse_entry).parse(input)?;
    Ok((input, TaskSection { title, entries }))
}

/// Drops lines starting with //, #, % or ; and blank lines
pub(crate) fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.is_empty()
                || trimmed.starts_with("//")
                || trimmed.starts_with('#')
                || trimmed.starts_with('%')
                || trimmed.starts_with(';'))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

pub fn parse_task(input: &str) -> HeatResult<TaskDocument> {
    let filtered = filter_comments(input);
    if filtered.trim().is_empty() {
        return Ok(TaskDocument::default());
    }
    let (remaining, sections) = many1(parse_section)
        .parse(filtered.as_str())
        .map_err(|e| HeatError::TaskParse(format!("parsing error: {:?}", e)))?;
    if !remaining.trim().is_empty() {
        let near: String = remaining.trim().chars().take(40).collect();
        return Err(HeatError::TaskParse(format!(
            "failed to parse entire document, stopped near `{}`",
            near
        )));
    }
    for (i, section) in sections.iter().enumerate() {
        if sections[..i].iter().any(|s| s.title == section.title) {
            return Err(HeatError::TaskParse(format!(
                "section `{}` appears twice",
                section.title
            )));
        }
        for (j, (key, _)) in section.entries.iter().enumerate() {
            if section.entries[..j].iter().any(|(k, _)| k == key) {
                return Err(HeatError::TaskParse(format!(
                    "key `{}` appears twice in section `{}`",
                    key, section.title
                )));
            }
        }
    }
    Ok(TaskDocument { sections })
}

pub fn parse_task_file<P: AsRef<Path>>(path: P) -> HeatResult<TaskDocument> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        HeatError::TaskParse(format!("cannot read {}: {}", path.as_ref().display(), e))
    })?;
    parse_task(&content)
}
