/// Branch grammar — turns a block's branch specification into a `BranchSpec`.
///
/// Grammar (after the enclosing parentheses were stripped by the parser):
///
/// ```text
/// branch  := ""                      -> Empty
///          | target                  -> DirectJump
///          | option (";" option)*    -> Menu
/// option  := label target
/// target  := "[" integer "]"
/// ```

use thiserror::Error;

use crate::core::lexer::clean;
use crate::schema::branch::{BranchSpec, JumpTarget, MenuOption, MAX_MENU_OPTIONS};

const TARGET_OPEN: char = '[';
const OPTION_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BranchError {
    #[error("branch target {target:?} in {spec:?} is not an integer")]
    InvalidTarget { spec: String, target: String },
    #[error("menu option {label:?} in {spec:?} has no [target]")]
    MissingTarget { spec: String, label: String },
}

/// Resolve a branch specification.
///
/// Options past the third are ignored. Blank option segments (for example
/// from a trailing `;`) are skipped.
pub fn resolve(branch_spec: &str) -> Result<BranchSpec, BranchError> {
    let spec = branch_spec.trim();
    if spec.is_empty() {
        return Ok(BranchSpec::Empty);
    }
    if spec.starts_with(TARGET_OPEN) {
        return parse_target(spec, spec).map(BranchSpec::DirectJump);
    }
    parse_menu(spec)
}

fn parse_menu(spec: &str) -> Result<BranchSpec, BranchError> {
    let segments: Vec<&str> = spec
        .split(OPTION_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() > MAX_MENU_OPTIONS {
        tracing::warn!(
            spec,
            options = segments.len(),
            "menu has more than {} options; ignoring the rest",
            MAX_MENU_OPTIONS
        );
    }

    let options = segments
        .into_iter()
        .take(MAX_MENU_OPTIONS)
        .map(|segment| parse_option(spec, segment))
        .collect::<Result<Vec<_>, _>>()?;

    if options.is_empty() {
        return Ok(BranchSpec::Empty);
    }
    Ok(BranchSpec::Menu(options))
}

fn parse_option(spec: &str, segment: &str) -> Result<MenuOption, BranchError> {
    let (label, target) =
        segment
            .split_once(TARGET_OPEN)
            .ok_or_else(|| BranchError::MissingTarget {
                spec: spec.to_string(),
                label: segment.to_string(),
            })?;
    Ok(MenuOption {
        label: label.trim().to_string(),
        target: parse_target(spec, target)?,
    })
}

/// Parse `[n]`, `n]` or `n` into a jump target.
fn parse_target(spec: &str, text: &str) -> Result<JumpTarget, BranchError> {
    let digits = clean(text).trim();
    digits
        .parse::<i64>()
        .map(JumpTarget::from_index)
        .map_err(|_| BranchError::InvalidTarget {
            spec: spec.to_string(),
            target: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(label: &str, target: JumpTarget) -> MenuOption {
        MenuOption {
            label: label.to_string(),
            target,
        }
    }

    #[test]
    fn empty_spec() {
        assert_eq!(resolve("").unwrap(), BranchSpec::Empty);
        assert_eq!(resolve("   ").unwrap(), BranchSpec::Empty);
    }

    #[test]
    fn direct_jump() {
        assert_eq!(
            resolve("[0]").unwrap(),
            BranchSpec::DirectJump(JumpTarget::Block(0))
        );
        assert_eq!(
            resolve("[ 12 ]").unwrap(),
            BranchSpec::DirectJump(JumpTarget::Block(12))
        );
    }

    #[test]
    fn direct_jump_to_exit() {
        assert_eq!(
            resolve("[-1]").unwrap(),
            BranchSpec::DirectJump(JumpTarget::ExitToMenu)
        );
    }

    #[test]
    fn two_option_menu() {
        assert_eq!(
            resolve("Go left[1];Go right[2]").unwrap(),
            BranchSpec::Menu(vec![
                option("Go left", JumpTarget::Block(1)),
                option("Go right", JumpTarget::Block(2)),
            ])
        );
    }

    #[test]
    fn single_option_menu() {
        assert_eq!(
            resolve("Continue[3]").unwrap(),
            BranchSpec::Menu(vec![option("Continue", JumpTarget::Block(3))])
        );
    }

    #[test]
    fn labels_are_trimmed() {
        assert_eq!(
            resolve("Stay [0]; Quit [-1]").unwrap(),
            BranchSpec::Menu(vec![
                option("Stay", JumpTarget::Block(0)),
                option("Quit", JumpTarget::ExitToMenu),
            ])
        );
    }

    #[test]
    fn menu_overflow_keeps_first_three() {
        let resolved = resolve("a[1];b[2];c[3];d[4];e[5]").unwrap();
        match resolved {
            BranchSpec::Menu(options) => {
                assert_eq!(options.len(), 3);
                assert_eq!(options[2], option("c", JumpTarget::Block(3)));
            }
            other => panic!("expected menu, got {:?}", other),
        }
    }

    #[test]
    fn overflow_segments_are_not_parsed() {
        assert!(resolve("a[1];b[2];c[3];not an option").is_ok());
    }

    #[test]
    fn trailing_separator_is_tolerated() {
        assert_eq!(
            resolve("Only[4];").unwrap(),
            BranchSpec::Menu(vec![option("Only", JumpTarget::Block(4))])
        );
    }

    #[test]
    fn only_separators_is_empty() {
        assert_eq!(resolve(";;").unwrap(), BranchSpec::Empty);
    }

    #[test]
    fn option_without_target_is_error() {
        assert!(matches!(
            resolve("Go left;Go right[2]"),
            Err(BranchError::MissingTarget { .. })
        ));
    }

    #[test]
    fn non_numeric_target_is_error() {
        assert!(matches!(
            resolve("Go[left]"),
            Err(BranchError::InvalidTarget { .. })
        ));
        assert!(matches!(
            resolve("[next]"),
            Err(BranchError::InvalidTarget { .. })
        ));
    }
}
