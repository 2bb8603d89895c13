//! Code table and codebook header: term <-> `T<rank>` mapping.

use std::collections::{BTreeSet, HashMap};

use kg_core::{KgError, Result};

/// Explanatory comment block placed ahead of the codebook entries.
const INSTRUCTIONS: &[&str] = &[
    "# Compressed Knowledge Graph",
    "# How to read this file:",
    "# - Every term is replaced by a short code; the codebook below maps codes back to terms.",
    "# - One line per node, then one line per link.",
    "# - Node lines:  N|ID|KEY=VALUE KEY=VALUE ...",
    "# - Link lines:  L|SOURCE|RELATION|TARGET",
    "# - Lists are written [VALUE,VALUE,...] and mappings {KEY:VALUE,KEY:VALUE,...}.",
    "# - In codebook terms, \\\\ \\n and \\r stand for backslash, newline and carriage return.",
    "# Codebook:",
];

pub fn instructions() -> &'static [&'static str] {
    INSTRUCTIONS
}

pub fn format_code(prefix: char, rank: usize) -> String {
    format!("{prefix}{rank}")
}

/// Generate the first `n` codes: T1, T2, ...
pub fn generate_codes(prefix: char, n: usize) -> Vec<String> {
    (1..=n).map(|rank| format_code(prefix, rank)).collect()
}

/// Whether `s` has the shape `<prefix><digits>` with a positive rank.
pub fn is_code(s: &str, prefix: char) -> bool {
    match s.strip_prefix(prefix) {
        Some(digits) => {
            !digits.is_empty() && !digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// Immutable term -> code assignment for one encoding run.
#[derive(Debug, Clone)]
pub struct CodeTable {
    prefix: char,
    /// Index `i` holds the term of rank `i + 1`.
    terms: Vec<String>,
    codes: HashMap<String, String>,
}

impl CodeTable {
    /// Assign codes over the sorted term set, rank 1 first.
    pub fn from_terms(terms: BTreeSet<String>, prefix: char) -> Self {
        let terms: Vec<String> = terms.into_iter().collect();
        let codes = terms
            .iter()
            .zip(generate_codes(prefix, terms.len()))
            .map(|(term, code)| (term.clone(), code))
            .collect();
        Self { prefix, terms, codes }
    }

    pub fn prefix(&self) -> char {
        self.prefix
    }

    /// Code for `term`; a miss means the collector skipped something the encoder visits.
    pub fn code(&self, term: &str) -> Result<&str> {
        self.codes
            .get(term)
            .map(String::as_str)
            .ok_or_else(|| KgError::MissingCode { term: term.to_string() })
    }

    pub fn term(&self, code: &str) -> Option<&str> {
        let rank: usize = code.strip_prefix(self.prefix)?.parse().ok()?;
        self.terms.get(rank.checked_sub(1)?).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `(code, term)` pairs in ascending rank.
    pub fn iter(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.terms
            .iter()
            .enumerate()
            .map(|(i, term)| (format_code(self.prefix, i + 1), term.as_str()))
    }

    /// One `#<code>:<term>` line per entry, ascending rank.
    pub fn render(&self) -> Vec<String> {
        self.iter()
            .map(|(code, term)| format!("#{code}:{}", escape_term(term)))
            .collect()
    }
}

pub fn escape_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_term`]. Unknown escapes are kept as written.
pub fn unescape_term(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parse `#<code>:<term>`. Returns `None` for any other comment line.
pub fn parse_codebook_line(line: &str, prefix: char) -> Option<(String, String)> {
    let (code, term) = line.strip_prefix('#')?.split_once(':')?;
    if !is_code(code, prefix) {
        return None;
    }
    Some((code.to_string(), unescape_term(term)))
}
