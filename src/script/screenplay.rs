/*!
 * Screenplay model built from classified script lines.
 *
 * A [`Screenplay`] is an accumulator of [`ScreenplayEntry`] values. Continuations
 * never edit an entry in place: the last entry is read, a new entry is derived from
 * it, and [`Screenplay::replace_last`] swaps it in.
 */

/// Speaker label for narration
pub const DEFAULT_NARRATOR: &str = "NARRATOR (V.O.)";

/// What an entry represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Scene heading
    Location,
    /// Named character
    Character,
    /// Default narrator
    Narrator,
}

/// One speaker-labelled block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenplayEntry {
    kind: EntryKind,
    label: String,
    lines: Vec<String>,
}

impl ScreenplayEntry {
    pub fn location(display: impl Into<String>) -> Self {
        Self { kind: EntryKind::Location, label: display.into(), lines: Vec::new() }
    }

    pub fn character(label: impl Into<String>) -> Self {
        Self { kind: EntryKind::Character, label: label.into(), lines: Vec::new() }
    }

    pub fn narration(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Narrator,
            label: DEFAULT_NARRATOR.to_string(),
            lines: vec![text.into()],
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// A bare scene heading; a heading that picked up dialogue no longer counts
    pub fn is_location(&self) -> bool {
        self.kind == EntryKind::Location && self.lines.is_empty()
    }

    pub fn is_narrator(&self) -> bool {
        self.kind == EntryKind::Narrator
    }

    /// Copy of this entry with one more line
    pub fn with_line(&self, line: impl Into<String>) -> Self {
        let mut entry = self.clone();
        entry.lines.push(line.into());
        entry
    }

    /// Copy of this entry with `text` joined onto its last line by a space
    pub fn with_continuation(&self, text: &str) -> Self {
        let mut entry = self.clone();
        match entry.lines.last_mut() {
            Some(last) => {
                last.push(' ');
                last.push_str(text);
            }
            None => entry.lines.push(text.to_string()),
        }
        entry
    }

    /// Screenplay text: the label, then one line each, every line newline-terminated
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(self.label.len() + 1);
        text.push_str(&self.label);
        text.push('\n');
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}

/// Ordered screenplay under construction
#[derive(Debug, Default, Clone)]
pub struct Screenplay {
    entries: Vec<ScreenplayEntry>,
}

impl Screenplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ScreenplayEntry) {
        self.entries.push(entry);
    }

    /// Swap the last entry for `entry`; appends when empty
    pub fn replace_last(&mut self, entry: ScreenplayEntry) {
        match self.entries.last_mut() {
            Some(last) => *last = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn last(&self) -> Option<&ScreenplayEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[ScreenplayEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<ScreenplayEntry> {
        self.entries
    }

    /// Scene heading; consecutive headings collapse into the latest
    pub fn add_location(&mut self, display: impl Into<String>) {
        let entry = ScreenplayEntry::location(display);
        if self.last().is_some_and(ScreenplayEntry::is_location) {
            self.replace_last(entry);
        } else {
            self.append(entry);
        }
    }

    /// New character entry; dialogue lines attach to it
    pub fn add_speaker(&mut self, label: impl Into<String>) {
        self.append(ScreenplayEntry::character(label));
    }

    /// Attach a spoken line to the previous entry; false when there is none
    pub fn add_dialogue(&mut self, text: impl Into<String>) -> bool {
        let Some(updated) = self.last().map(|last| last.with_line(text)) else {
            return false;
        };
        self.replace_last(updated);
        true
    }

    /// Narration merges into a preceding narrator entry, otherwise starts one
    pub fn add_narration(&mut self, text: &str) {
        match self.last() {
            Some(last) if last.is_narrator() => {
                let merged = last.with_continuation(text);
                self.replace_last(merged);
            }
            _ => self.append(ScreenplayEntry::narration(text)),
        }
    }

    /// The whole screenplay as text
    pub fn render(&self) -> String {
        self.entries.iter().map(ScreenplayEntry::render).collect()
    }
}
