//! Path-pattern grammar.
//!
//! ```text
//! pattern   := part*
//! part      := literal | param | wildcard | regex | group
//! param     := ':' name ( '(' regex-body ')' )? '?'?
//! wildcard  := '*' '?'?
//! regex     := '(' regex-body ')' '?'?
//! group     := '{' part* '}' '?'?
//! literal   := any other char, or '\' followed by any char
//! ```
//!
//! An optional param or wildcard directly after a `/` swallows that `/`, so
//! `/users/:id?` matches both `/users` and `/users/7`.
//!
//! Literal text is percent-encoded the way parsed addresses encode their
//! paths, so `/café/:id` matches `/caf%C3%A9/7`.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::error::PatternError;

/// Characters a URL path encodes
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// One parsed piece of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Literal(String),
    Param {
        name: String,
        constraint: Option<String>,
        optional: bool,
    },
    /// `*` or an unnamed `(regex)`
    Unnamed {
        constraint: Option<String>,
        optional: bool,
    },
    Group {
        tokens: Vec<Token>,
        optional: bool,
    },
}

/// Default matcher for a single path segment
pub(crate) const SEGMENT: &str = "[^/]+";

struct Parser<'a> {
    pattern: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
    names: Vec<String>,
}

/// Parse a pattern into tokens, returning the tokens and the param names in order
pub(crate) fn tokenize(pattern: &str) -> Result<(Vec<Token>, Vec<String>), PatternError> {
    let mut parser = Parser {
        pattern,
        chars: pattern.char_indices().collect(),
        pos: 0,
        names: Vec::new(),
    };
    let tokens = parser.parts(false)?;
    Ok((tokens, parser.names))
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.pattern.len())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat_optional(&mut self) -> bool {
        if self.peek() == Some('?') {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unbalanced(&self) -> PatternError {
        PatternError::UnbalancedGroup {
            pattern: self.pattern.to_string(),
        }
    }

    fn parts(&mut self, in_group: bool) -> Result<Vec<Token>, PatternError> {
        let mut tokens = Vec::new();
        let mut literal = String::new();

        loop {
            let Some(c) = self.peek() else {
                if in_group {
                    return Err(self.unbalanced());
                }
                break;
            };

            match c {
                '}' => {
                    if !in_group {
                        return Err(self.unbalanced());
                    }
                    self.pos += 1;
                    break;
                }
                '{' => {
                    self.pos += 1;
                    flush(&mut literal, &mut tokens);
                    let inner = self.parts(true)?;
                    let optional = self.eat_optional();
                    tokens.push(Token::Group {
                        tokens: inner,
                        optional,
                    });
                }
                ':' => {
                    let at = self.offset();
                    self.pos += 1;
                    let name = self.name(at)?;
                    let constraint = if self.peek() == Some('(') {
                        Some(self.regex_body()?)
                    } else {
                        None
                    };
                    let optional = self.eat_optional();
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::Param {
                        name,
                        constraint,
                        optional,
                    });
                }
                '*' => {
                    self.pos += 1;
                    let optional = self.eat_optional();
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::Unnamed {
                        constraint: None,
                        optional,
                    });
                }
                '(' => {
                    let constraint = self.regex_body()?;
                    let optional = self.eat_optional();
                    flush(&mut literal, &mut tokens);
                    tokens.push(Token::Unnamed {
                        constraint: Some(constraint),
                        optional,
                    });
                }
                '\\' => {
                    self.pos += 1;
                    match self.bump() {
                        Some(escaped) => literal.push(escaped),
                        None => literal.push('\\'),
                    }
                }
                other => {
                    self.pos += 1;
                    literal.push(other);
                }
            }
        }

        flush(&mut literal, &mut tokens);
        Ok(tokens)
    }

    fn name(&mut self, at: usize) -> Result<String, PatternError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            let valid = if name.is_empty() {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_'
            };
            if !valid {
                break;
            }
            name.push(c);
            self.pos += 1;
        }

        if name.is_empty() {
            return Err(PatternError::InvalidParamName {
                pattern: self.pattern.to_string(),
                position: at,
            });
        }
        if self.names.contains(&name) {
            return Err(PatternError::DuplicateParam { name });
        }
        self.names.push(name.clone());
        Ok(name)
    }

    /// Read a balanced `( ... )` body, honouring `\` escapes and character classes
    fn regex_body(&mut self) -> Result<String, PatternError> {
        // consume '('
        self.pos += 1;
        let mut depth = 1usize;
        let mut in_class = false;
        let mut body = String::new();

        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    body.push(c);
                    if let Some(next) = self.bump() {
                        body.push(next);
                    }
                    continue;
                }
                '[' if !in_class => in_class = true,
                ']' if in_class => in_class = false,
                '(' if !in_class => depth += 1,
                ')' if !in_class => {
                    depth -= 1;
                    if depth == 0 {
                        if body.is_empty() {
                            break;
                        }
                        return Ok(body);
                    }
                }
                _ => {}
            }
            body.push(c);
        }

        Err(PatternError::InvalidRegex {
            pattern: self.pattern.to_string(),
            reason: "unterminated or empty regex group".to_string(),
        })
    }
}

fn flush(literal: &mut String, tokens: &mut Vec<Token>) {
    if !literal.is_empty() {
        tokens.push(Token::Literal(std::mem::take(literal)));
    }
}

/// Render tokens as an anchored-less regex body with named capture groups
pub(crate) fn to_regex_source(tokens: &[Token]) -> String {
    let mut out = String::new();
    render(tokens, &mut out);
    out
}

fn render(tokens: &[Token], out: &mut String) {
    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::Literal(text) => {
                let swallow = text.ends_with('/')
                    && tokens.get(i + 1).is_some_and(is_optional_segment);
                if swallow {
                    out.push_str(&escape_literal(&text[..text.len() - 1]));
                    i += 1;
                    render_segment(&tokens[i], "/", out);
                } else {
                    out.push_str(&escape_literal(text));
                }
            }
            Token::Group { tokens: inner, optional } => {
                out.push_str("(?:");
                render(inner, out);
                out.push(')');
                if *optional {
                    out.push('?');
                }
            }
            segment => render_segment(segment, "", out),
        }
        i += 1;
    }
}

fn escape_literal(text: &str) -> String {
    regex::escape(&utf8_percent_encode(text, PATH).to_string())
}

fn is_optional_segment(token: &Token) -> bool {
    matches!(
        token,
        Token::Param { optional: true, .. } | Token::Unnamed { optional: true, .. }
    )
}

fn render_segment(token: &Token, prefix: &str, out: &mut String) {
    let (name, constraint, optional) = match token {
        Token::Param {
            name,
            constraint,
            optional,
        } => (Some(name.as_str()), constraint.as_deref(), *optional),
        Token::Unnamed {
            constraint,
            optional,
        } => (None, constraint.as_deref(), *optional),
        _ => return,
    };
    let body = constraint.unwrap_or(SEGMENT);

    if optional {
        out.push_str("(?:");
    }
    out.push_str(&regex::escape(prefix));
    match name {
        Some(name) => {
            out.push_str("(?P<");
            out.push_str(name);
            out.push('>');
        }
        None => out.push_str("(?:"),
    }
    out.push_str(body);
    out.push(')');
    if optional {
        out.push_str(")?");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_named_and_literal() {
        let (tokens, names) = tokenize("/users/:id").unwrap();
        assert_eq!(names, vec!["id"]);
        assert_eq!(
            tokens,
            vec![
                Token::Literal("/users/".to_string()),
                Token::Param {
                    name: "id".to_string(),
                    constraint: None,
                    optional: false
                }
            ]
        );
    }

    #[test]
    fn test_tokenize_regex_constraint_with_nested_parens() {
        let (tokens, _) = tokenize("/v/:ver(v(\\d+))").unwrap();
        assert_eq!(
            tokens[1],
            Token::Param {
                name: "ver".to_string(),
                constraint: Some("v(\\d+)".to_string()),
                optional: false
            }
        );
    }

    #[test]
    fn test_tokenize_group() {
        let (tokens, names) = tokenize("/cps/:cpId{/element/:elId}?").unwrap();
        assert_eq!(names, vec!["cpId", "elId"]);
        assert!(matches!(tokens.last(), Some(Token::Group { optional: true, .. })));
    }

    #[test]
    fn test_unbalanced_groups() {
        assert!(matches!(
            tokenize("/a{/b"),
            Err(PatternError::UnbalancedGroup { .. })
        ));
        assert!(matches!(
            tokenize("/a}/b"),
            Err(PatternError::UnbalancedGroup { .. })
        ));
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(
            tokenize("/a/:"),
            Err(PatternError::InvalidParamName { position: 3, .. })
        ));
        assert!(matches!(
            tokenize("/a/:1abc"),
            Err(PatternError::InvalidParamName { .. })
        ));
        assert_eq!(
            tokenize("/:id/x/:id"),
            Err(PatternError::DuplicateParam {
                name: "id".to_string()
            })
        );
    }

    #[test]
    fn test_unterminated_regex() {
        assert!(matches!(
            tokenize("/:year(\\d+"),
            Err(PatternError::InvalidRegex { .. })
        ));
        assert!(matches!(
            tokenize("/:year()"),
            Err(PatternError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_render_escapes_literals() {
        let (tokens, _) = tokenize("/files.v1/:name").unwrap();
        assert_eq!(to_regex_source(&tokens), r"/files\.v1/(?P<name>[^/]+)");
    }

    #[test]
    fn test_render_optional_param_swallows_slash() {
        let (tokens, _) = tokenize("/users/:id?").unwrap();
        assert_eq!(to_regex_source(&tokens), "/users(?:/(?P<id>[^/]+))?");
    }

    #[test]
    fn test_render_wildcard_and_group() {
        let (tokens, _) = tokenize("/a/*{/b/:c}?").unwrap();
        assert_eq!(
            to_regex_source(&tokens),
            "/a/(?:[^/]+)(?:/b/(?P<c>[^/]+))?"
        );
    }

    #[test]
    fn test_escaped_special_chars_are_literal() {
        let (tokens, names) = tokenize("/price\\:usd").unwrap();
        assert!(names.is_empty());
        assert_eq!(tokens, vec![Token::Literal("/price:usd".to_string())]);
    }
}
