use thiserror::Error;

/// Shell metacharacters that are never allowed in an unquoted argument
const SHELL_METACHARACTERS: &[char] = &[';', '|', '&', '$', '(', ')', '`'];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    #[error("unsafe argument: shell metacharacter '{0}'")]
    ShellMetacharacter(char),

    #[error("unsafe argument: path traversal in '{0}'")]
    PathTraversal(String),

    #[error("unsafe argument: unterminated quote")]
    UnterminatedQuote,
}

/// Validate a single raw argument token.
///
/// Content inside a correctly quoted segment is taken literally and not
/// further interpreted; everything outside quotes is checked for shell
/// metacharacters and path-traversal sequences.
pub fn validate(token: &str) -> Result<(), SanitizeError> {
    let unquoted = unquoted_view(token)?;
    check_unquoted(&unquoted)
}

/// Split a raw command line into sanitized tokens.
///
/// Quotes preserve internal spaces as one token and exempt their content from
/// metacharacter checks; the quote characters themselves are stripped. The
/// first unsafe token short-circuits the whole invocation.
pub fn sanitize_tokens(raw: &str) -> Result<Vec<String>, SanitizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut unquoted = String::new();
    let mut started = false;
    let mut quote: Option<char> = None;

    for ch in raw.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                } else {
                    current.push(ch);
                }
            }
            None => match ch {
                '\'' | '"' => {
                    quote = Some(ch);
                    started = true;
                }
                c if c.is_whitespace() => {
                    if started {
                        check_unquoted(&unquoted)?;
                        tokens.push(std::mem::take(&mut current));
                        unquoted.clear();
                        started = false;
                    }
                }
                c => {
                    if SHELL_METACHARACTERS.contains(&c) {
                        return Err(SanitizeError::ShellMetacharacter(c));
                    }
                    current.push(c);
                    unquoted.push(c);
                    started = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(SanitizeError::UnterminatedQuote);
    }

    if started {
        check_unquoted(&unquoted)?;
        tokens.push(current);
    }

    Ok(tokens)
}

/// Collect the characters of a token that sit outside quoted segments
fn unquoted_view(token: &str) -> Result<String, SanitizeError> {
    let mut unquoted = String::new();
    let mut quote: Option<char> = None;

    for ch in token.chars() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                c => unquoted.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(SanitizeError::UnterminatedQuote);
    }

    Ok(unquoted)
}

fn check_unquoted(unquoted: &str) -> Result<(), SanitizeError> {
    for ch in unquoted.chars() {
        if SHELL_METACHARACTERS.contains(&ch) {
            return Err(SanitizeError::ShellMetacharacter(ch));
        }
    }

    if unquoted.contains("../") || unquoted.contains("/..") {
        return Err(SanitizeError::PathTraversal(unquoted.to_string()));
    }

    Ok(())
}
