use crate::domain::{DocumentError, Fields};
use crate::util::text::{lines, trim_blank_lines, Line};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    // `## Name`; `###` and deeper are ordinary content
    static ref MARKER_REGEX: Regex = Regex::new(r"^##(?:[ \t]+(.*))?$")
        .expect("Failed to compile section marker regex");

    // fence run, then the info string (opening) or nothing but whitespace (closing)
    static ref FENCE_REGEX: Regex = Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)$")
        .expect("Failed to compile code fence regex");
}

struct Marker<'a> {
    name: &'a str,
    line: Line<'a>,
}

/// Drop an optional closing `#` run, as in `## Front ##`.
fn strip_closing_hashes(name: &str) -> &str {
    let without = name.trim_end_matches('#');
    if without.len() == name.len() {
        return name;
    }
    if without.is_empty() || without.ends_with([' ', '\t']) {
        without.trim_end()
    } else {
        name
    }
}

/// The fence run of a line opening a fenced code block.
///
/// A backtick fence whose info string contains a backtick is an inline code
/// span, not a fence.
fn opening_fence(text: &str) -> Option<&str> {
    let cap = FENCE_REGEX.captures(text)?;
    let fence = cap.get(1)?.as_str();
    let info = cap.get(2).map_or("", |m| m.as_str());
    if fence.starts_with('`') && info.contains('`') {
        return None;
    }
    Some(fence)
}

/// A closing fence uses the opening character, is at least as long, and has
/// no info string.
fn closes_fence(text: &str, open: &str) -> bool {
    let Some(cap) = FENCE_REGEX.captures(text) else {
        return false;
    };
    let (Some(fence), Some(rest)) = (cap.get(1), cap.get(2)) else {
        return false;
    };
    let fence = fence.as_str();
    fence.starts_with(&open[..1]) && fence.len() >= open.len() && rest.as_str().trim().is_empty()
}

fn find_markers(body: &str) -> Vec<Marker<'_>> {
    let mut markers = Vec::new();
    let mut open_fence: Option<&str> = None;

    for line in lines(body) {
        if let Some(open) = open_fence {
            if closes_fence(line.text, open) {
                open_fence = None;
            }
            continue;
        }
        if let Some(fence) = opening_fence(line.text) {
            open_fence = Some(fence);
            continue;
        }
        if let Some(cap) = MARKER_REGEX.captures(line.text) {
            let name = cap.get(1).map(|m| m.as_str().trim()).unwrap_or("");
            markers.push(Marker {
                name: strip_closing_hashes(name),
                line,
            });
        }
    }

    markers
}

/// Split a note body into `## ` sections, keeping their order.
///
/// `first_line` is the file line number of the first body line, used in errors.
pub fn extract_sections(body: &str, first_line: usize) -> Result<Fields, DocumentError> {
    let markers = find_markers(body);
    let Some(first) = markers.first() else {
        return Err(DocumentError::NoSections);
    };

    if !trim_blank_lines(&body[..first.line.start]).is_empty() {
        debug!("Ignoring text before the first section");
    }

    let mut fields = Fields::with_capacity(markers.len());
    for (index, marker) in markers.iter().enumerate() {
        let line_number = first_line + marker.line.number - 1;
        if marker.name.is_empty() {
            return Err(DocumentError::malformed(line_number, "section heading has no name"));
        }
        if fields.contains_key(marker.name) {
            return Err(DocumentError::DuplicateSection {
                name: marker.name.to_string(),
                line: line_number,
            });
        }

        let start = marker.line.end();
        let end = markers
            .get(index + 1)
            .map_or(body.len(), |next| next.line.start);
        let value = trim_blank_lines(&body[start..end]);

        fields.insert(marker.name.to_string(), value.to_string());
    }

    Ok(fields)
}
