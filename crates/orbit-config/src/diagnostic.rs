// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Load failures reported by figment become [`ConfigError`]s. An unknown key
//! in one of the fixed sections carries the closest valid key as a hint and,
//! when the offending file is at hand, a label pointing at the line.

#![allow(unused_assignments)] // generated by the miette derive

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a candidate key must exceed to be suggested.
const SIMILARITY_CUTOFF: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(orbit::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Keys accepted by the section, comma separated.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(orbit::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("duplicate adapter name `{name}`")]
    #[diagnostic(
        code(orbit::config::duplicate_adapter),
        help("adapter names must be unique; rename or remove one of the [[adapters]] entries")
    )]
    DuplicateAdapter { name: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(orbit::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(orbit::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let expected = format!("expected one of: {valid_keys}");
    match suggestion {
        Some(key) => format!("did you mean `{key}`? {expected}"),
        None => expected,
    }
}

/// Convert every error carried by a figment failure.
///
/// `sources` pairs each loaded file path with its contents and is only used
/// to label unknown keys.
pub fn from_figment(err: figment::Error, sources: &[(String, String)]) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(field, expected) => {
            let (span, src) = label_key(error, field, sources).unzip();
            ConfigError::UnknownKey {
                key: field.clone(),
                suggestion: closest_key(field, expected).map(str::to_string),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::InvalidType(found, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            found: found.to_string(),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

fn label_key(
    error: &figment::Error,
    key: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = error
        .metadata
        .as_ref()
        .and_then(|meta| meta.source.as_ref())
        .and_then(|source| source.file_path())
        .map(|path| path.display().to_string());

    // Inline strings carry no path; a lone source is unambiguous.
    let (path, content) = match (origin, sources) {
        (Some(origin), _) => sources.iter().find(|(path, _)| *path == origin)?,
        (None, [only]) => only,
        (None, _) => return None,
    };

    let section = error.path.first().map(String::as_str);
    let offset = locate_key(content, section, key)?;
    Some((
        SourceSpan::from((offset, key.len())),
        NamedSource::new(path, content.clone()),
    ))
}

/// Byte offset of the line assigning `key` within `[section]`.
///
/// With no section, only the lines before the first table header are
/// searched. Array-of-tables headers (`[[adapters]]`) match their bare name.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let body = line.trim_start();
        if body.starts_with('[') {
            current = Some(body.trim_end().trim_matches(['[', ']']).trim());
        } else if current == section
            && body
                .strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with('='))
        {
            return Some(offset + line.len() - body.len());
        }
        offset += line.len();
    }

    None
}

/// The candidate most similar to `unknown`, if any is close enough.
pub fn closest_key<'a>(unknown: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| (strsim::jaro_winkler(unknown, candidate), *candidate))
        .filter(|(score, _)| *score > SIMILARITY_CUTOFF)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate)
}

/// Print each error to stderr with miette's graphical report handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
