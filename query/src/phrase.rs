/// Parsed form of the free-text search box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchPhrase {
    Empty,
    /// `=...`: predicate fragment spliced in verbatim.
    Raw(String),
    /// `~...`: one literal substring.
    Exact(String),
    Tokens(Vec<Token>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// `+word`
    Required(String),
    /// `-word`
    Excluded(String),
    /// `word`
    Any(String),
}

pub fn parse_phrase(input: &str) -> SearchPhrase {
    let trimmed = input.trim();
    if let Some(raw) = trimmed.strip_prefix('=') {
        let raw = raw.trim();
        return if raw.is_empty() {
            SearchPhrase::Empty
        } else {
            SearchPhrase::Raw(raw.to_string())
        };
    }
    if let Some(exact) = trimmed.strip_prefix('~') {
        return if exact.is_empty() {
            SearchPhrase::Empty
        } else {
            SearchPhrase::Exact(exact.to_string())
        };
    }

    let tokens: Vec<Token> = trimmed
        .split_whitespace()
        .filter_map(|word| {
            if let Some(rest) = word.strip_prefix('+') {
                (!rest.is_empty()).then(|| Token::Required(rest.to_string()))
            } else if let Some(rest) = word.strip_prefix('-') {
                (!rest.is_empty()).then(|| Token::Excluded(rest.to_string()))
            } else {
                Some(Token::Any(word.to_string()))
            }
        })
        .collect();

    if tokens.is_empty() {
        SearchPhrase::Empty
    } else {
        SearchPhrase::Tokens(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(parse_phrase(""), SearchPhrase::Empty);
        assert_eq!(parse_phrase("   "), SearchPhrase::Empty);
        assert_eq!(parse_phrase("="), SearchPhrase::Empty);
        assert_eq!(parse_phrase("~"), SearchPhrase::Empty);
        assert_eq!(parse_phrase("+ -"), SearchPhrase::Empty);
    }

    #[test]
    fn sigils_select_modes() {
        assert_eq!(
            parse_phrase("= f.size > 10"),
            SearchPhrase::Raw("f.size > 10".to_string())
        );
        assert_eq!(
            parse_phrase("~red car"),
            SearchPhrase::Exact("red car".to_string())
        );
    }

    #[test]
    fn tokens_keep_prefix_meaning() {
        assert_eq!(
            parse_phrase("  +car -toy  wheel "),
            SearchPhrase::Tokens(vec![
                Token::Required("car".to_string()),
                Token::Excluded("toy".to_string()),
                Token::Any("wheel".to_string()),
            ])
        );
    }
}
