use std::collections::HashSet;
use std::str::FromStr;

use log::debug;

use crate::error::HeaderError;

/// Numeric interpretation of a field, from the TYPE directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float,
    UnsignedInt,
    SignedInt,
}

impl FieldType {
    pub fn tag(self) -> char {
        match self {
            FieldType::Float => 'F',
            FieldType::UnsignedInt => 'U',
            FieldType::SignedInt => 'I',
        }
    }
}

impl FromStr for FieldType {
    type Err = HeaderError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "F" | "f" => Ok(FieldType::Float),
            "U" | "u" => Ok(FieldType::UnsignedInt),
            "I" | "i" => Ok(FieldType::SignedInt),
            other => Err(HeaderError::InvalidType(other.to_string())),
        }
    }
}

/// Record encoding named by the DATA directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEncoding {
    Ascii,
    Binary,
    BinaryCompressed,
}

impl FromStr for DataEncoding {
    type Err = HeaderError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        // "ascill" is a misspelling some producers write out
        match token.to_ascii_lowercase().as_str() {
            "ascii" | "ascill" => Ok(DataEncoding::Ascii),
            "binary" => Ok(DataEncoding::Binary),
            "binary_compressed" => Ok(DataEncoding::BinaryCompressed),
            _ => Err(HeaderError::UnknownEncoding(token.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub version: Option<f32>,
    pub fields: Vec<String>,
    pub sizes: Vec<usize>,
    pub types: Vec<FieldType>,
    pub counts: Vec<usize>,
    pub width: usize,
    pub height: usize,
    pub viewpoint: Option<String>,
    pub points: usize,
    pub data: DataEncoding,
    /// Byte offset of the first record, just past the DATA line.
    pub header_len: usize,
}

impl Header {
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field == name)
    }
}

/// Parses the header at the start of `raw`.
///
/// Only the bytes up to and including the DATA line are read, so the record
/// payload that follows may be arbitrary binary.
pub fn parse_header(raw: &[u8]) -> Result<Header, HeaderError> {
    let (header_len, data_token) =
        find_data_line(raw).ok_or(HeaderError::MissingDirective("DATA"))?;
    let data: DataEncoding = data_token.parse()?;

    let text = String::from_utf8_lossy(&raw[..header_len]);
    let directives = Directives::collect(&text);

    let fields: Vec<String> = directives
        .get("FIELDS")
        .ok_or(HeaderError::MissingDirective("FIELDS"))?
        .iter()
        .map(|token| token.to_string())
        .collect();
    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.as_str()) {
            return Err(HeaderError::DuplicateField(field.clone()));
        }
    }

    let version = directives
        .get("VERSION")
        .and_then(|tokens| tokens.first())
        .map(|token| parse_number::<f32>("VERSION", token))
        .transpose()?;
    let sizes = parse_list::<usize>(&directives, "SIZE")?.unwrap_or_default();
    let types = match directives.get("TYPE") {
        Some(tokens) => tokens
            .iter()
            .map(|token| token.parse())
            .collect::<Result<Vec<FieldType>, _>>()?,
        None => Vec::new(),
    };
    let counts =
        parse_list::<usize>(&directives, "COUNT")?.unwrap_or_else(|| vec![1; fields.len()]);
    let width = parse_scalar::<usize>(&directives, "WIDTH")?.unwrap_or(0);
    let height = parse_scalar::<usize>(&directives, "HEIGHT")?.unwrap_or(1);
    let points =
        parse_scalar::<usize>(&directives, "POINTS")?.unwrap_or(width.saturating_mul(height));
    let viewpoint = directives.get("VIEWPOINT").map(|tokens| tokens.join(" "));

    let header = Header {
        version,
        fields,
        sizes,
        types,
        counts,
        width,
        height,
        viewpoint,
        points,
        data,
        header_len,
    };
    debug!(
        "parsed PCD header: fields={:?} points={} data={:?} header_len={}",
        header.fields, header.points, header.data, header.header_len
    );

    Ok(header)
}

/// Locates the first `DATA <token>` line, returning the offset just past its
/// newline together with the token.
fn find_data_line(raw: &[u8]) -> Option<(usize, String)> {
    let mut start = 0;
    while start < raw.len() {
        let (line, next) = match raw[start..].iter().position(|&b| b == b'\n') {
            Some(offset) => (&raw[start..start + offset], start + offset + 1),
            None => (&raw[start..], raw.len()),
        };

        let line = line.split(|&b| b == b'#').next().unwrap_or_default();
        let mut tokens = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty());
        if let (Some(keyword), Some(token)) = (tokens.next(), tokens.next()) {
            if keyword.eq_ignore_ascii_case(b"DATA") {
                return Some((next, String::from_utf8_lossy(token).into_owned()));
            }
        }

        start = next;
    }
    None
}

/// First occurrence of each directive, comments removed.
struct Directives<'a> {
    entries: Vec<(String, Vec<&'a str>)>,
}

impl<'a> Directives<'a> {
    fn collect(text: &'a str) -> Self {
        let mut entries: Vec<(String, Vec<&'a str>)> = Vec::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default();
            let mut tokens = line.split_whitespace();
            let Some(keyword) = tokens.next() else {
                continue;
            };
            let keyword = keyword.to_ascii_uppercase();
            if entries.iter().any(|(existing, _)| *existing == keyword) {
                continue;
            }
            entries.push((keyword, tokens.collect()));
        }
        Directives { entries }
    }

    fn get(&self, keyword: &str) -> Option<&Vec<&'a str>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == keyword)
            .map(|(_, tokens)| tokens)
    }
}

fn parse_number<T: FromStr>(directive: &'static str, token: &str) -> Result<T, HeaderError> {
    token.parse::<T>().map_err(|_| HeaderError::InvalidNumber {
        directive,
        token: token.to_string(),
    })
}

fn parse_list<T: FromStr>(
    directives: &Directives,
    directive: &'static str,
) -> Result<Option<Vec<T>>, HeaderError> {
    directives
        .get(directive)
        .map(|tokens| {
            tokens
                .iter()
                .map(|token| parse_number(directive, token))
                .collect::<Result<Vec<T>, _>>()
        })
        .transpose()
}

fn parse_scalar<T: FromStr>(
    directives: &Directives,
    directive: &'static str,
) -> Result<Option<T>, HeaderError> {
    match directives.get(directive).and_then(|tokens| tokens.first()) {
        Some(token) => parse_number(directive, token).map(Some),
        None => Ok(None),
    }
}
