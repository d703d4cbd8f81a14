/*!
 * Paragraph reconstruction for hard-wrapped prose.
 *
 * Raw book text is wrapped at a fixed column and littered with page numbers and
 * chapter headings. This module rebuilds paragraphs by joining wrapped lines and
 * dropping trivial lines.
 */

// @const: Characters that close a paragraph when they end a line
const LINE_ENDINGS: [char; 4] = ['.', '?', '\'', '"'];

/// Abbreviated titles that end in a full stop but never end a paragraph
pub const ABBREVIATED_TITLES: &[&str] = &[
    "Mr.", "Mrs.", "Ms.", "Mx.", "Dr.", "Prof.", "Rev.", "Fr.", "St.", "Sr.", "Jr.", "Gen.",
    "Col.", "Capt.", "Lt.", "Sgt.", "Cpl.", "Maj.", "Adm.", "Gov.", "Sen.", "Rep.", "Hon.",
    "Messrs.", "Mme.", "Mlle.",
];

/// Strip a byte order mark and turn curly quotes into straight ones
pub fn normalize_source(content: &str) -> String {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect()
}

// @checks: Line may open a paragraph
fn is_paragraph_start(line: &str) -> bool {
    match line.chars().next() {
        Some(c) => c.is_numeric() || (c.is_alphabetic() && c.is_uppercase()) || c == '\'',
        None => false,
    }
}

// @checks: Line closes the current paragraph
fn is_end_of_paragraph(line: &str) -> bool {
    if ABBREVIATED_TITLES.iter().any(|title| line.ends_with(title)) {
        return false;
    }
    line.ends_with(LINE_ENDINGS)
}

// @checks: Page numbers and similar digit-only lines
fn is_digit_only(line: &str) -> bool {
    line.chars().all(|c| c.is_numeric())
}

fn is_chapter_marker(line: &str) -> bool {
    line.to_lowercase().starts_with("chapter")
}

/// Split normalized text into paragraphs.
///
/// Wrapped lines are joined with single spaces. Blank and digit-only lines are
/// skipped; a chapter heading contributes a literal line break to the paragraph
/// being built instead of its text. Text before the first line that can open a
/// paragraph is discarded. Never fails; odd input yields odd paragraphs.
pub fn reconstruct_paragraphs(content: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.split('\n') {
        let line = line.trim();
        if line.is_empty() || is_digit_only(line) {
            continue;
        }
        if is_chapter_marker(line) {
            current.push("\n");
            continue;
        }

        if current.is_empty() && !is_paragraph_start(line) {
            continue;
        }
        current.push(line);

        if is_end_of_paragraph(line) {
            paragraphs.push(current.join(" "));
            current.clear();
        }
    }

    // leftover text keeps its chapter breaks
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}
