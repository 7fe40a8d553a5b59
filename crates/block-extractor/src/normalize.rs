//! Line-level cleanup ahead of directive classification.

/// Comment-scanner state carried across line boundaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentState {
    /// Outside any block comment.
    #[default]
    InCode,
    /// Inside a `/* ... */` comment that has not terminated yet.
    InBlockComment,
}

/// Removes `//` line comments and `/* ... */` block comments from one line.
///
/// A pure step function: the caller threads the returned state into the next
/// call, which is what carries an unterminated block comment across line
/// boundaries. Never fails; a comment that never terminates simply swallows
/// the rest of the input.
pub fn strip_comments(line: &str, state: CommentState) -> (String, CommentState) {
    if !line.contains('/') {
        return match state {
            CommentState::InCode => (line.to_string(), state),
            CommentState::InBlockComment => (String::new(), state),
        };
    }

    let chars: Vec<char> = line.chars().collect();
    let mut result = String::with_capacity(line.len());
    let mut state = state;

    for i in 0..chars.len() {
        match state {
            CommentState::InBlockComment => {
                // terminator detection looks backwards, so a "*/" split
                // across two lines does not close the comment
                if chars[i] == '/' && i > 0 && chars[i - 1] == '*' {
                    state = CommentState::InCode;
                }
            }
            CommentState::InCode => {
                if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
                    break; // line comment, the rest of the line is gone
                } else if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                    state = CommentState::InBlockComment;
                } else {
                    result.push(chars[i]);
                }
            }
        }
    }

    (result, state)
}

/// Collapses whitespace between a leading `#` and the directive keyword, so
/// that `#   if` and `#\tendif` classify like `#if` and `#endif`.
pub fn collapse_directive_hash(line: &str) -> String {
    match line.strip_prefix('#') {
        Some(rest) => format!("#{}", rest.trim_start()),
        None => line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn in_code(line: &str) -> (String, CommentState) {
        strip_comments(line, CommentState::InCode)
    }

    #[test]
    fn line_without_slash_passes_through() {
        assert_eq!(in_code("int x = 1;"), ("int x = 1;".to_string(), CommentState::InCode));
    }

    #[test]
    fn line_comment_discards_rest_of_line() {
        assert_eq!(in_code("code(); // trailing"), ("code(); ".to_string(), CommentState::InCode));
    }

    #[test]
    fn closed_block_comment_is_removed_in_place() {
        let (out, state) = in_code("a /* comment */ b");
        assert_eq!(out, "a  b");
        assert_eq!(state, CommentState::InCode);
    }

    #[test]
    fn open_block_comment_carries_into_next_line() {
        let (out, state) = in_code("code /* begins");
        assert_eq!(out, "code ");
        assert_eq!(state, CommentState::InBlockComment);

        let (out, state) = strip_comments("still inside", state);
        assert_eq!(out, "");
        assert_eq!(state, CommentState::InBlockComment);

        let (out, state) = strip_comments("done */ tail", state);
        assert_eq!(out, " tail");
        assert_eq!(state, CommentState::InCode);
    }

    #[test]
    fn comment_line_without_slash_is_discarded() {
        let (out, state) = strip_comments(" * doc line", CommentState::InBlockComment);
        assert_eq!(out, "");
        assert_eq!(state, CommentState::InBlockComment);
    }

    #[test]
    fn terminator_at_line_start_closes() {
        let (out, state) = strip_comments("*/ x", CommentState::InBlockComment);
        assert_eq!(out, " x");
        assert_eq!(state, CommentState::InCode);
    }

    #[test]
    fn slash_star_slash_closes_the_comment_it_opens() {
        // "/*/" opens and immediately closes: the '*' serves both ends
        let (out, state) = in_code("a/*/b");
        assert_eq!(out, "ab");
        assert_eq!(state, CommentState::InCode);
    }

    #[test]
    fn split_terminator_does_not_close() {
        let (_, state) = in_code("begin /* trailing star *");
        assert_eq!(state, CommentState::InBlockComment);
        // the '/' at the start of the next line has no '*' before it
        let (out, state) = strip_comments("/", state);
        assert_eq!(out, "");
        assert_eq!(state, CommentState::InBlockComment);
    }

    #[test]
    fn line_comment_inside_block_comment_is_inert() {
        let (out, state) = strip_comments("a // b */ c", CommentState::InBlockComment);
        assert_eq!(out, " c");
        assert_eq!(state, CommentState::InCode);
    }

    #[test]
    fn hash_space_collapsing() {
        assert_eq!(collapse_directive_hash("#   if defined(A)"), "#if defined(A)");
        assert_eq!(collapse_directive_hash("#\tendif"), "#endif");
        assert_eq!(collapse_directive_hash("#if x"), "#if x");
        assert_eq!(collapse_directive_hash("#"), "#");
        assert_eq!(collapse_directive_hash("not a directive"), "not a directive");
    }
}
