//! Best-effort extraction of sections from LLM-generated minutes.
//!
//! The model is asked to follow a template but nothing guarantees it does, so
//! every function here returns an empty string when its section is missing.

const TITLE_LABELS: &[&str] = &[
    "título da ata",
    "titulo da ata",
    "título",
    "titulo",
    "title",
];

const OBJECTIVE_LABEL: &str = "objetivo";

/// Extracts the minutes title.
///
/// A `Título: ...` line wins; otherwise a bare `Título` / `Título da ATA`
/// heading yields the next non-empty line.
pub fn extract_title(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = text.lines().collect();

    // Pass 1: "Título: value", value possibly on the following line.
    for (i, line) in lines.iter().enumerate() {
        let Some(tail) = match_label(line, TITLE_LABELS) else {
            continue;
        };
        let Some(value) = after_colon(tail) else {
            continue;
        };
        if !value.is_empty() {
            return value.to_string();
        }
        if let Some(next) = next_non_empty(&lines[i + 1..]) {
            return next;
        }
    }

    // Pass 2: heading line followed by the title.
    for (i, line) in lines.iter().enumerate() {
        let Some(tail) = match_label(line, TITLE_LABELS) else {
            continue;
        };
        if !trim_markup(tail).is_empty() {
            continue;
        }
        if let Some(next) = next_non_empty(&lines[i + 1..]) {
            return next;
        }
    }

    String::new()
}

/// Extracts the "Próximos passos" block: everything after the label up to the
/// first blank line.
pub fn extract_next_steps(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = text.lines().collect();
    let Some((start, tail)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| match_next_steps_label(line).map(|tail| (i, tail)))
    else {
        return String::new();
    };

    let first = trim_markup(tail);
    let first = first.strip_prefix(':').unwrap_or(first).trim();

    let mut collected: Vec<&str> = Vec::new();
    if !first.is_empty() {
        collected.push(first);
    }

    for line in &lines[start + 1..] {
        if line.trim().is_empty() {
            if collected.is_empty() {
                continue;
            }
            break;
        }
        collected.push(*line);
    }

    collected.join("\n").trim().to_string()
}

/// Extracts the body from the `Objetivo` section up to the next-steps
/// section (or the end), prefixed with `"Objetivo:\n"`.
pub fn extract_objective(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let lines: Vec<&str> = text.lines().collect();
    let Some((start, tail)) = lines.iter().enumerate().find_map(|(i, line)| {
        match_label(line, &[OBJECTIVE_LABEL]).map(|tail| (i, tail))
    }) else {
        return String::new();
    };

    let tail = tail.strip_prefix('s').unwrap_or(tail);
    let first = trim_markup(tail);
    let first = first.strip_prefix(':').unwrap_or(first).trim();

    let mut body: Vec<&str> = vec![first];
    for line in &lines[start + 1..] {
        if starts_next_section(line) {
            break;
        }
        body.push(*line);
    }

    format!("Objetivo:\n{}", body.join("\n").trim())
}

/// Case-insensitive `strip_prefix` that slices on char boundaries of `s`.
fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = s.char_indices();
    for expected in prefix.chars() {
        let (_, c) = chars.next()?;
        if !c.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let rest = chars.next().map(|(i, _)| i).unwrap_or(s.len());
    Some(&s[rest..])
}

/// Drops heading/emphasis/list decoration the model likes to add around labels.
fn strip_markup(line: &str) -> &str {
    line.trim()
        .trim_start_matches(|c: char| matches!(c, '#' | '*' | '_' | '>' | '-') || c.is_whitespace())
}

fn trim_markup(s: &str) -> &str {
    s.trim_matches(|c: char| matches!(c, '*' | '_') || c.is_whitespace())
}

/// Returns what follows the first matching label on `line`.
fn match_label<'a>(line: &'a str, labels: &[&str]) -> Option<&'a str> {
    let stripped = strip_markup(line);
    labels
        .iter()
        .find_map(|label| strip_prefix_ci(stripped, label))
}

fn after_colon(tail: &str) -> Option<&str> {
    trim_markup(tail).strip_prefix(':').map(trim_markup)
}

fn next_non_empty(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .map(|l| trim_markup(strip_markup(l)))
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Matches `próximo(s) passo(s)`, accent optional.
fn match_next_steps_label(line: &str) -> Option<&str> {
    let stripped = strip_markup(line);
    let rest = strip_prefix_ci(stripped, "próximo").or_else(|| strip_prefix_ci(stripped, "proximo"))?;
    let rest = rest.strip_prefix(['s', 'S']).unwrap_or(rest);
    let trimmed = rest.trim_start();
    if trimmed.len() == rest.len() {
        return None;
    }
    let rest = strip_prefix_ci(trimmed, "passo").or_else(|| strip_prefix_ci(trimmed, "pass"))?;
    Some(rest.strip_prefix(['s', 'S']).unwrap_or(rest))
}

fn starts_next_section(line: &str) -> bool {
    let stripped = strip_markup(line);
    strip_prefix_ci(stripped, "próximo").is_some() || strip_prefix_ci(stripped, "proximo").is_some()
}
