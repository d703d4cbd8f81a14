/*!
 * Line classification for the script markup.
 *
 * Every line is classified once into a [`ScriptLine`] by its leading punctuation:
 *
 * - `;` comment, including the `;◇◇◇：` scene description markers
 * - `@` command, including the `@nm t="Name"` name tags
 * - `*` annotation (labels and line markers)
 * - `"` dialogue
 * - a letter: narration
 *
 * Dialogue and narration carry the text with `[r]` (line return) and `[np]`
 * (new page) escape codes resolved.
 */

use crate::errors::ScriptError;

/// Scene description prefix
pub const LOCATION_PREFIX: &str = ";◇◇◇：";

/// The legend line of the scene description key, not a real location
pub const LOCATION_PLACEHOLDER: &str = ";◇◇◇：背景指定  ：～昼夕夜etc";

/// Name tag command prefix
pub const NAME_TAG_PREFIX: &str = "@nm t=\"";

/// Command that links to another script, i.e. a branch
pub const BRANCH_COMMAND: &str = "@exlink";

/// One classified script line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    /// Empty after trimming
    Blank,
    /// `;` comment, or the location placeholder
    Comment,
    /// `@` command other than a name tag
    Command,
    /// `*` label or line annotation
    Annotation,
    /// Character name from an `@nm` tag
    NameTag(String),
    /// Scene description; holds the whole marker line
    Location(String),
    /// Spoken line, quotes and escapes removed
    Dialogue(String),
    /// Narration, escapes removed
    Narration(String),
    /// Anything else
    Unknown,
}

/// Classify one raw line; `line_number` is 1-based and only used for errors
pub fn classify_line(line: &str, line_number: usize) -> Result<ScriptLine, ScriptError> {
    let line = line.trim();

    if line.starts_with(LOCATION_PREFIX) {
        if line.starts_with(LOCATION_PLACEHOLDER) {
            return Ok(ScriptLine::Comment);
        }
        return Ok(ScriptLine::Location(line.to_string()));
    }

    if let Some(rest) = line.strip_prefix(NAME_TAG_PREFIX) {
        return match rest.find('"') {
            Some(end) => Ok(ScriptLine::NameTag(rest[..end].to_string())),
            None => Err(ScriptError::UnterminatedName {
                line_number,
                line: line.to_string(),
            }),
        };
    }

    let Some(first) = line.chars().next() else {
        return Ok(ScriptLine::Blank);
    };

    Ok(match first {
        ';' => ScriptLine::Comment,
        '@' => ScriptLine::Command,
        '*' => ScriptLine::Annotation,
        '"' => ScriptLine::Dialogue(strip_escapes(line).trim_matches('"').to_string()),
        c if c.is_alphabetic() => ScriptLine::Narration(strip_escapes(line)),
        _ => ScriptLine::Unknown,
    })
}

/// Resolve `[r]` to a space and remove `[np]`
pub fn strip_escapes(text: &str) -> String {
    text.replace("[r]", " ").replace("[np]", "")
}

/// True if the line is a branch/link command
pub fn is_branch_command(line: &str) -> bool {
    line.trim_start().starts_with(BRANCH_COMMAND)
}
