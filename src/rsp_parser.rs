//! Compiler response file (`.rsp`) parsing
//!
//! Unity lets projects pass extra compiler arguments through response files
//! such as `Assets/csc.rsp`. Only the options that change how the IDE sees the
//! code are interpreted (defines, references, unsafe); everything else is
//! passed through verbatim.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::host::ResponseFileData;

fn option_regex() -> &'static Regex {
    static OPTION: OnceLock<Regex> = OnceLock::new();
    OPTION.get_or_init(|| {
        Regex::new(r"^[-/](?P<name>[A-Za-z][A-Za-z0-9_]*[+-]?)(?::(?P<value>.*))?$")
            .expect("option pattern is valid")
    })
}

/// Parse the response file at `response_file_path`, resolved against `project_directory`
pub fn parse_response_file(
    response_file_path: &str,
    project_directory: &Path,
    system_reference_directories: &[PathBuf],
) -> ResponseFileData {
    let full_path = project_directory.join(response_file_path);
    match fs::read_to_string(&full_path) {
        Ok(content) => parse_response_text(&content, project_directory, system_reference_directories),
        Err(e) => ResponseFileData {
            errors: vec![format!("Response file not found: {} ({})", response_file_path, e)],
            ..Default::default()
        },
    }
}

/// Parse response file content. Errors are collected, parsing continues past them.
pub fn parse_response_text(
    content: &str,
    project_directory: &Path,
    system_reference_directories: &[PathBuf],
) -> ResponseFileData {
    let mut data = ResponseFileData::default();

    for (index, line) in content.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }

        let tokens = match tokenize_line(line) {
            Ok(tokens) => tokens,
            Err(tokens) => {
                data.errors.push(format!("Unterminated quote on line {}", index + 1));
                tokens
            }
        };

        for token in tokens {
            apply_argument(&token, &mut data, project_directory, system_reference_directories);
        }
    }

    data
}

/// Split a line on whitespace, honoring double quotes.
///
/// On an unterminated quote the tokens before it are returned as `Err`.
fn tokenize_line(line: &str) -> Result<Vec<String>, Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if in_quotes {
        return Err(tokens);
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn apply_argument(
    token: &str,
    data: &mut ResponseFileData,
    project_directory: &Path,
    system_reference_directories: &[PathBuf],
) {
    let Some(captures) = option_regex().captures(token) else {
        data.errors.push(format!("Invalid argument: {}", token));
        return;
    };

    let name = captures["name"].to_lowercase();
    let value = captures.name("value").map(|m| m.as_str().trim()).unwrap_or("");

    match name.as_str() {
        "define" | "d" => {
            if value.is_empty() {
                data.errors.push(format!("Option '{}' requires a value", token));
                return;
            }
            data.defines.extend(
                value
                    .split([';', ','])
                    .map(str::trim)
                    .filter(|define| !define.is_empty())
                    .map(str::to_string),
            );
        }
        "reference" | "r" => {
            if value.is_empty() {
                data.errors.push(format!("Option '{}' requires a value", token));
                return;
            }
            for reference in value.split(';').map(str::trim).filter(|r| !r.is_empty()) {
                match resolve_reference(reference, project_directory, system_reference_directories) {
                    Some(resolved) => data.full_path_references.push(resolved),
                    None => data.errors.push(format!("Reference not found: {}", reference)),
                }
            }
        }
        "unsafe" | "unsafe+" => data.unsafe_code = true,
        "unsafe-" => data.unsafe_code = false,
        _ => data.other_arguments.push(token.to_string()),
    }
}

/// Rooted references are taken as-is; others are looked up in the project
/// directory first, then in each system directory.
fn resolve_reference(
    reference: &str,
    project_directory: &Path,
    system_reference_directories: &[PathBuf],
) -> Option<String> {
    let path = Path::new(reference);
    if path.is_absolute() {
        return Some(reference.to_string());
    }

    std::iter::once(project_directory)
        .chain(system_reference_directories.iter().map(PathBuf::as_path))
        .map(|dir| dir.join(path))
        .find(|candidate| candidate.exists())
        .map(|candidate| candidate.to_string_lossy().replace('\\', "/"))
}

#[cfg(test)]
#[path = "rsp_parser_tests.rs"]
mod tests;
