/// Script parser — classifies raw script lines and groups them into blocks.

use thiserror::Error;

use crate::core::lexer::clean;
use crate::schema::block::Block;
use crate::schema::line::{Line, COMMAND_SIGIL};
use crate::schema::program::Program;

const COMMENT_MARK: char = '#';
const BRANCH_MARK: char = '(';
const SPEAKER_DELIMITER: char = '-';
const ARGUMENT_DELIMITER: char = '(';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("line {line_no}: dialogue line has no '-' between speaker and content: {content:?}")]
    MissingSpeakerDelimiter { line_no: usize, content: String },
    #[error("line {line_no}: command line has no '(' before its argument: {content:?}")]
    MissingArgumentDelimiter { line_no: usize, content: String },
}

impl ParseError {
    /// 1-based number of the offending script line.
    pub fn line_no(&self) -> usize {
        match self {
            Self::MissingSpeakerDelimiter { line_no, .. }
            | Self::MissingArgumentDelimiter { line_no, .. } => *line_no,
        }
    }
}

/// The interpretation of a single line of script text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptLine {
    /// Blank, trivial, or comment.
    Skip,
    /// Closes the current block with this (cleaned) branch specification.
    Branch(String),
    /// A spoken or command line appended to the current block.
    Entry(Line),
}

/// Parser behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep lines written after the final branch line as a last block with
    /// an empty branch spec. When false they are dropped.
    pub flush_trailing_lines: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            flush_trailing_lines: true,
        }
    }
}

/// Classify one raw line. `line_no` is only used for diagnostics.
pub fn classify_line(raw: &str, line_no: usize) -> Result<ScriptLine, ParseError> {
    let mut chars = raw.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return Ok(ScriptLine::Skip),
    };
    if chars.next().is_none() || raw.trim().is_empty() {
        return Ok(ScriptLine::Skip);
    }

    match first {
        COMMENT_MARK => Ok(ScriptLine::Skip),
        BRANCH_MARK => Ok(ScriptLine::Branch(clean(raw).to_string())),
        COMMAND_SIGIL => {
            let (name, argument) = raw.split_once(ARGUMENT_DELIMITER).ok_or_else(|| {
                ParseError::MissingArgumentDelimiter {
                    line_no,
                    content: raw.to_string(),
                }
            })?;
            Ok(ScriptLine::Entry(Line::command(clean(name), clean(argument))))
        }
        _ => {
            let (speaker, content) = raw.split_once(SPEAKER_DELIMITER).ok_or_else(|| {
                ParseError::MissingSpeakerDelimiter {
                    line_no,
                    content: raw.to_string(),
                }
            })?;
            Ok(ScriptLine::Entry(Line::spoken(clean(speaker), clean(content))))
        }
    }
}

/// Parse a whole script with default options.
pub fn parse_script(text: &str) -> Result<Program, ParseError> {
    parse_script_with(text, ParseOptions::default())
}

/// Parse a whole script into a [`Program`].
///
/// Any malformed line aborts the parse; no partial program is returned.
pub fn parse_script_with(text: &str, options: ParseOptions) -> Result<Program, ParseError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut blocks = Vec::new();
    let mut pending: Vec<Line> = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        match classify_line(raw, idx + 1)? {
            ScriptLine::Skip => {}
            ScriptLine::Entry(line) => pending.push(line),
            ScriptLine::Branch(spec) => {
                tracing::trace!(
                    block = blocks.len(),
                    lines = pending.len(),
                    branch = %spec,
                    "closing block"
                );
                blocks.push(Block::new(std::mem::take(&mut pending), spec));
            }
        }
    }

    if !pending.is_empty() {
        if options.flush_trailing_lines {
            tracing::warn!(
                lines = pending.len(),
                block = blocks.len(),
                "script ends without a branch line; keeping trailing lines as a final block"
            );
            blocks.push(Block::new(pending, ""));
        } else {
            tracing::warn!(
                lines = pending.len(),
                "script ends without a branch line; dropping trailing lines"
            );
        }
    }

    tracing::debug!(blocks = blocks.len(), "parsed script");
    Ok(Program::new(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_blank_and_trivial() {
        assert_eq!(classify_line("", 1).unwrap(), ScriptLine::Skip);
        assert_eq!(classify_line("x", 1).unwrap(), ScriptLine::Skip);
        assert_eq!(classify_line("\r", 1).unwrap(), ScriptLine::Skip);
        assert_eq!(classify_line("    ", 1).unwrap(), ScriptLine::Skip);
    }

    #[test]
    fn classify_comment() {
        assert_eq!(
            classify_line("# Alice - not a line", 1).unwrap(),
            ScriptLine::Skip
        );
    }

    #[test]
    fn classify_branch_lines() {
        assert_eq!(
            classify_line("()", 1).unwrap(),
            ScriptLine::Branch(String::new())
        );
        assert_eq!(
            classify_line("([4])\r", 1).unwrap(),
            ScriptLine::Branch("[4]".to_string())
        );
        assert_eq!(
            classify_line("(Go left[1];Go right[2])", 1).unwrap(),
            ScriptLine::Branch("Go left[1];Go right[2]".to_string())
        );
    }

    #[test]
    fn classify_command_line() {
        assert_eq!(
            classify_line("/wait(3)", 1).unwrap(),
            ScriptLine::Entry(Line::command("wait", "3"))
        );
        assert_eq!(
            classify_line("/playMusic()\r", 1).unwrap(),
            ScriptLine::Entry(Line::command("playMusic", ""))
        );
    }

    #[test]
    fn command_argument_keeps_inner_parens() {
        assert_eq!(
            classify_line("/bg(hall (night))", 1).unwrap(),
            ScriptLine::Entry(Line::command("bg", "hall (night)"))
        );
    }

    #[test]
    fn classify_spoken_line() {
        assert_eq!(
            classify_line("Alice - Hi", 1).unwrap(),
            ScriptLine::Entry(Line::spoken("Alice", "Hi"))
        );
    }

    #[test]
    fn spoken_content_keeps_later_dashes() {
        assert_eq!(
            classify_line("Bob - Well - maybe.", 1).unwrap(),
            ScriptLine::Entry(Line::spoken("Bob", "Well - maybe."))
        );
    }

    #[test]
    fn missing_speaker_delimiter_is_error() {
        let err = classify_line("Alice says hi", 7).unwrap_err();
        assert_eq!(err.line_no(), 7);
        assert!(matches!(err, ParseError::MissingSpeakerDelimiter { .. }));
    }

    #[test]
    fn missing_argument_delimiter_is_error() {
        let err = classify_line("/fadeIn", 2).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingArgumentDelimiter { line_no: 2, .. }
        ));
    }

    #[test]
    fn parse_single_block() {
        let program = parse_script("Alice - Hi\nBob - Hi back\n()\n").unwrap();
        assert_eq!(program.len(), 1);
        let block = program.block(0).unwrap();
        assert_eq!(
            block.lines,
            vec![Line::spoken("Alice", "Hi"), Line::spoken("Bob", "Hi back")]
        );
        assert_eq!(block.branch_spec, "");
    }

    #[test]
    fn parse_multiple_blocks() {
        let script = "\
# intro
/bg(hall)
Alice - Which way?
(Left[1];Right[2])
Alice - Left it is.
([-1])
Alice - Right it is.
()
";
        let program = parse_script(script).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.blocks[0].lines.len(), 2);
        assert_eq!(program.blocks[0].branch_spec, "Left[1];Right[2]");
        assert_eq!(program.blocks[1].branch_spec, "[-1]");
        assert_eq!(program.blocks[2].branch_spec, "");
    }

    #[test]
    fn consecutive_branch_lines_make_empty_block() {
        let program = parse_script("A - x\n([1])\n()\n").unwrap();
        assert_eq!(program.len(), 2);
        assert!(program.blocks[1].is_empty());
    }

    #[test]
    fn parse_accepts_crlf_and_bom() {
        let program = parse_script("\u{feff}Alice - Hi\r\nBob - Yo\r\n()\r\n").unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.blocks[0].lines[1], Line::spoken("Bob", "Yo"));
    }

    #[test]
    fn trailing_lines_flushed_by_default() {
        let program = parse_script("A - one\n()\nB - two\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.blocks[1].lines, vec![Line::spoken("B", "two")]);
        assert_eq!(program.blocks[1].branch_spec, "");
    }

    #[test]
    fn trailing_lines_dropped_when_disabled() {
        let options = ParseOptions {
            flush_trailing_lines: false,
        };
        let program = parse_script_with("A - one\n()\nB - two\n", options).unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn malformed_line_aborts_parse() {
        let err = parse_script("A - fine\nbroken line\n()\n").unwrap_err();
        assert_eq!(err.line_no(), 2);
    }

    #[test]
    fn error_message_names_the_line_once() {
        let err = parse_script("A - fine\nbroken line\n()\n").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("line 2: "));
        assert_eq!(message.matches("line 2").count(), 1);
    }

    #[test]
    fn empty_script_is_empty_program() {
        assert!(parse_script("").unwrap().is_empty());
        assert!(parse_script("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn parsing_is_deterministic() {
        let script = "/w(1)\nNarrator - Dusk.\n(Stay[0];Go[-1])\n";
        assert_eq!(parse_script(script).unwrap(), parse_script(script).unwrap());
    }
}
