//! Reader for the tab-separated tableau file format
//!
//! ```text
//! (blank)  min-weight  (blank)  Max      *Coda     <- row 1: full names
//! (blank)  (blank)     (blank)  Max      *Coda     <- row 2: short names
//! tap      tap         1        0        1         <- new tableau /tap/
//!          ta          0        1                  <- appended candidate
//! [end of tableaux]
//! [noise]  0.5         (blank)  0.1      0.3       <- directive rows
//! ```
//!
//! Malformed rows never abort the parse. They are recorded on the tableau
//! set's error and warning lists and reflected in [`ParseReport::success`].

use std::path::Path;

use tracing::{debug, info, warn};

use lingnet_common::{IngestError, Result};

use crate::model::{Constraint, ConstraintFamily, TableauSet};

/// Marker opening a comment line
const COMMENT_MARKER: &str = "/**";

/// Row separating tableaux from directives
const END_OF_TABLEAUX: &str = "[end of tableaux]";

/// Column of the first constraint in header, candidate and directive rows
const FIRST_CONSTRAINT_COLUMN: usize = 3;

/// A kept source line with its 1-based line number
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedLine {
    pub number: usize,
    /// Tab-separated fields, trailing empty fields dropped
    pub fields: Vec<String>,
}

impl NumberedLine {
    /// Trimmed field `i`, empty when absent
    fn field(&self, i: usize) -> &str {
        self.fields.get(i).map(|f| f.trim()).unwrap_or("")
    }
}

/// Outcome of parsing one grammar file
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub tableau_set: TableauSet,
    /// False when a structural problem made part of the file unusable
    pub success: bool,
}

/// Discard blank and comment lines, escape angle-bracket fragments
pub fn prune_lines(text: &str) -> Vec<NumberedLine> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with(COMMENT_MARKER)
        })
        .map(|(i, line)| NumberedLine {
            number: i + 1,
            fields: split_fields(&escape_angle_brackets(line)),
        })
        .collect()
}

fn split_fields(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line
        .trim_end_matches(['\r', '\n'])
        .split('\t')
        .map(str::to_string)
        .collect();
    while fields.last().map(|f| f.is_empty()).unwrap_or(false) {
        fields.pop();
    }
    fields
}

/// `<x>` becomes `&lt;x&gt;`; an unmatched `<` is left alone
fn escape_angle_brackets(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        match after.find('>') {
            Some(close) => {
                out.push_str(&rest[..open]);
                out.push_str("&lt;");
                out.push_str(&after[..close]);
                out.push_str("&gt;");
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Lenient number parse: anything unreadable counts as 0
fn parse_number(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// First substring matching `[+-]?\d+(\.\d+)?`
fn find_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut start = i;
            if start > 0 && (bytes[start - 1] == b'+' || bytes[start - 1] == b'-') {
                start -= 1;
            }
            let mut end = i;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
                end += 1;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
            }
            return s[start..end].parse().ok();
        }
        i += 1;
    }
    None
}

/// Directive tag of a row and the column holding its scalar value
///
/// The tag sits in the first column, or in the second when the first is
/// empty.
fn directive_tag(line: &NumberedLine) -> Option<(String, usize)> {
    let first = line.field(0);
    if first.starts_with('[') {
        return Some((first.to_ascii_lowercase(), 1));
    }
    let second = line.field(1);
    if first.is_empty() && second.starts_with('[') {
        return Some((second.to_ascii_lowercase(), 2));
    }
    None
}

fn is_end_of_tableaux(line: &NumberedLine) -> bool {
    matches!(directive_tag(line), Some((tag, _)) if tag == END_OF_TABLEAUX)
}

/// Parse a whole grammar file held in memory
pub fn parse_tableau_set(text: &str, source_name: &str) -> ParseReport {
    let mut ts = TableauSet::new();
    ts.source_name = source_name.to_string();
    let lines = prune_lines(text);
    let success = read_lines(&mut ts, &lines);
    ts.validate_winners();

    debug!(
        source = source_name,
        tableaux = ts.tableau_count(),
        constraints = ts.constraint_count(),
        errors = ts.errors().len(),
        "Parsed tableau set"
    );

    ParseReport {
        tableau_set: ts,
        success,
    }
}

/// Read and parse a grammar file from disk
///
/// Only an unreadable or wholly empty file is an `Err`; everything else is
/// reported through the returned tableau set.
pub fn read_tableau_set(path: impl AsRef<Path>) -> Result<ParseReport> {
    let path = path.as_ref();
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| IngestError::Unreadable {
        path: shown.clone(),
        reason: e.to_string(),
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::Empty { path: shown }.into());
    }

    let source_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| shown.clone());
    let report = parse_tableau_set(&text, &source_name);

    for error in report.tableau_set.errors() {
        warn!(path = %shown, "{}", error);
    }
    info!(
        path = %shown,
        tableaux = report.tableau_set.tableau_count(),
        candidates = report.tableau_set.candidate_count(),
        constraints = report.tableau_set.constraint_count(),
        success = report.success,
        "Loaded grammar file"
    );
    Ok(report)
}

fn read_lines(ts: &mut TableauSet, lines: &[NumberedLine]) -> bool {
    let (row1, row2) = match lines {
        [row1, row2, ..] => (row1, row2),
        [only] => {
            ts.add_error(format!(
                "No constraint names were found in line no. {}.",
                only.number
            ));
            return false;
        }
        [] => {
            ts.add_error("The file contains no constraint names and no tableaux.");
            return false;
        }
    };

    if row1.fields.len() != row2.fields.len() {
        ts.add_error(format!(
            "The number of constraints found in line no. {} did not match \
             the number of constraints found in line no. {}.",
            row1.number, row2.number
        ));
        return false;
    }
    if row1.fields.len() <= FIRST_CONSTRAINT_COLUMN {
        ts.add_error(format!(
            "No constraint names were found in line no. {}.",
            row1.number
        ));
        return false;
    }

    if let Some(min_weight) = find_number(row1.field(1)) {
        ts.min_constraint_weight = min_weight;
    }
    for i in FIRST_CONSTRAINT_COLUMN..row1.fields.len() {
        ts.add_constraint(Constraint::new(row1.field(i), row2.field(i)));
    }

    let mut success = true;
    let mut body = lines[2..].iter();
    for line in body.by_ref() {
        if is_end_of_tableaux(line) {
            break;
        }
        success &= read_tableau_row(ts, line);
    }
    for line in body {
        read_directive(ts, line);
    }

    if ts.is_empty() {
        ts.add_warning(format!("No tableaux were found in {}.", ts.source_name));
    }
    success
}

fn read_tableau_row(ts: &mut TableauSet, line: &NumberedLine) -> bool {
    if line.fields.len() < 2 {
        ts.add_error(format!("Line no. {} could not be read.", line.number));
        return false;
    }

    let input = line.field(0);
    let tableau = if !input.is_empty() {
        ts.add_tableau(input)
    } else if let Some(last) = ts.tableau_count().checked_sub(1) {
        last
    } else {
        ts.add_error(format!(
            "Line no. {} could not be associated with any input.",
            line.number
        ));
        return true;
    };

    let frequency = parse_number(line.field(2));
    let violations: Vec<f64> = line
        .fields
        .iter()
        .skip(FIRST_CONSTRAINT_COLUMN)
        .map(|f| parse_number(f))
        .collect();
    if violations.len() > ts.constraint_count() {
        debug!(line = line.number, "Truncated over-long violation row");
    }

    // The tableau index was just produced by the set itself
    ts.add_candidate(tableau, line.field(1), frequency, &violations)
        .is_ok()
}

/// Non-empty per-constraint cells of a directive row as (constraint, text)
fn constraint_cells(line: &NumberedLine, constraint_count: usize) -> Vec<(usize, String)> {
    (0..constraint_count)
        .map(|c| (c, line.field(FIRST_CONSTRAINT_COLUMN + c).to_string()))
        .filter(|(_, text)| !text.is_empty())
        .collect()
}

fn read_directive(ts: &mut TableauSet, line: &NumberedLine) {
    let Some((tag, scalar_column)) = directive_tag(line) else {
        ts.add_warning(format!(
            "Line no. {} after the end of the tableaux was ignored.",
            line.number
        ));
        return;
    };
    let scalar = line.field(scalar_column).to_string();
    let cells = constraint_cells(line, ts.constraint_count());

    match tag.as_str() {
        "[lexically specific constraints]" => {
            if !scalar.is_empty() {
                ts.lexically_specific_constraints = scalar != "0";
            }
        }
        "[rate]" => {
            if !scalar.is_empty() {
                ts.rate = parse_number(&scalar);
            }
        }
        "[output stage]" => {
            if !scalar.is_empty() {
                ts.output_stage = parse_number(&scalar);
            }
        }
        "[bias]" => {
            for (c, text) in cells {
                if let Ok(con) = ts.constraint_mut(c) {
                    con.bias = parse_number(&text);
                }
            }
        }
        "[initial ranking]" => {
            for (c, text) in cells {
                if let Ok(con) = ts.constraint_mut(c) {
                    con.initial_ranking = parse_number(&text);
                }
            }
        }
        "[minimal weight]" => {
            if !scalar.is_empty() {
                ts.min_constraint_weight = parse_number(&scalar);
            }
            for (c, text) in cells {
                if let Ok(con) = ts.constraint_mut(c) {
                    con.min_weight = Some(parse_number(&text));
                }
            }
        }
        "[noise]" => {
            if !scalar.is_empty() {
                ts.noise = parse_number(&scalar);
            }
            for (c, text) in cells {
                if let Ok(con) = ts.constraint_mut(c) {
                    con.noise = Some(parse_number(&text));
                }
            }
        }
        "[family]" => {
            for (c, code) in cells {
                match ConstraintFamily::from_code(&code) {
                    Some(family) => {
                        if let Ok(con) = ts.constraint_mut(c) {
                            con.family = Some(family);
                        }
                    }
                    None => ts.add_warning(format!(
                        "Unknown constraint family '{}' in line no. {}.",
                        code, line.number
                    )),
                }
            }
        }
        "[end of tableaux]" => {}
        other => ts.add_warning(format!(
            "Unknown directive {} in line no. {} was ignored.",
            other, line.number
        )),
    }
}
