//! Tokenizer: on islenmis kaynagi token akisina cevirir.
//!
//! Her konumda taninma sirasi sabittir ve ilk eslesme kazanir: dizge,
//! sayi, 2 karakterlik noktalama, 2 karakterlik operator, 1 karakterlik
//! noktalama, 1 karakterlik operator, anahtar sozcuk, tanimlayici.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Punctuation,
    Number,
    String,
    Keyword,
    Identifier,
    Operator,
}

/// Kaynak dilimine isaret eden token; metin `text()` ile geri alinir.
#[derive(Clone, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub length: usize,
    pub line: u16,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.start + self.length]
    }
}

const PUNCTUATION_TWO: [&str; 2] = ["->", "::"];
const PUNCTUATION_ONE: [u8; 10] = [b'.', b',', b':', b';', b'(', b')', b'{', b'}', b'[', b']'];

// ORDER MATTERS: iki karakterlikler tek karakterliklerden once denenir
const OPERATORS_TWO: [&str; 12] = [
    "++", "--", "+=", "-=", "*=", "/=", "==", "!=", ">=", "<=", "&&", "||",
];
const OPERATORS_ONE: [u8; 12] = [
    b'+', b'-', b'*', b'/', b'!', b'=', b'>', b'<', b'&', b'|', b'~', b'^',
];

/// Atama deyimi tespiti bu alt kumeyi kullanir.
pub const ASSIGNMENT_OPERATORS: [&str; 5] = ["=", "+=", "-=", "*=", "/="];

const KEYWORDS: [&str; 38] = [
    "break",
    "case",
    "class",
    "const",
    "const_cast",
    "continue",
    "default",
    "delete",
    "do",
    "dynamic_cast",
    "else",
    "enum",
    "false",
    "for",
    "if",
    "namespace",
    "new",
    "nullptr",
    "operator",
    "private",
    "protected",
    "public",
    "reinterpret_cast",
    "return",
    "sizeof",
    "static",
    "static_cast",
    "struct",
    "switch",
    "this",
    "true",
    "typedef",
    "union",
    "unsigned",
    "using",
    "virtual",
    "void",
    "while",
];

fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut cursor = 0usize;
    let mut line: u16 = 1;

    while cursor < bytes.len() {
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            if bytes[cursor] == b'\n' {
                line += 1;
            }
            cursor += 1;
        }
        if cursor >= bytes.len() {
            break;
        }

        let start = cursor;
        let c = bytes[cursor];
        let push = |kind: TokenKind, end: usize| Token {
            kind,
            start,
            length: end - start,
            line,
        };

        // dizge: kacisli '\"' dizgeyi bitirmez
        if c == b'"' {
            cursor += 1;
            while cursor < bytes.len() && !(bytes[cursor] == b'"' && bytes[cursor - 1] != b'\\') {
                cursor += 1;
            }
            cursor = (cursor + 1).min(bytes.len());
            tokens.push(push(TokenKind::String, cursor));
            continue;
        }

        // sayi: rakamla baslar, [0-9.fxu] acgozlu tuketilir
        if c.is_ascii_digit() {
            cursor += 1;
            while cursor < bytes.len()
                && matches!(bytes[cursor], b'0'..=b'9' | b'.' | b'f' | b'x' | b'u')
            {
                cursor += 1;
            }
            tokens.push(push(TokenKind::Number, cursor));
            continue;
        }

        let rest = &source[cursor..];

        if PUNCTUATION_TWO.iter().any(|p| rest.starts_with(p)) {
            cursor += 2;
            tokens.push(push(TokenKind::Punctuation, cursor));
            continue;
        }

        if OPERATORS_TWO.iter().any(|op| rest.starts_with(op)) {
            cursor += 2;
            tokens.push(push(TokenKind::Operator, cursor));
            continue;
        }

        if PUNCTUATION_ONE.contains(&c) {
            cursor += 1;
            tokens.push(push(TokenKind::Punctuation, cursor));
            continue;
        }

        if OPERATORS_ONE.contains(&c) {
            cursor += 1;
            tokens.push(push(TokenKind::Operator, cursor));
            continue;
        }

        // anahtar sozcuk: sozcuk siniri aranir, yoksa tanimlayicidir
        if let Some(keyword) = KEYWORDS.iter().find(|kw| {
            rest.starts_with(**kw)
                && !rest
                    .as_bytes()
                    .get(kw.len())
                    .copied()
                    .map_or(false, is_identifier_byte)
        }) {
            cursor += keyword.len();
            tokens.push(push(TokenKind::Keyword, cursor));
            continue;
        }

        cursor += 1;
        while cursor < bytes.len() && is_identifier_byte(bytes[cursor]) {
            cursor += 1;
        }
        tokens.push(push(TokenKind::Identifier, cursor));
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_texts(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.text(source).to_string()))
            .collect()
    }

    #[test]
    fn declaration_tokens() {
        let toks = kinds_and_texts("int x = 3;");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Identifier, "int".into()),
                (TokenKind::Identifier, "x".into()),
                (TokenKind::Operator, "=".into()),
                (TokenKind::Number, "3".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn two_char_tokens_beat_one_char() {
        let toks = kinds_and_texts("p->x += 1; a == b;");
        let texts: Vec<&str> = toks.iter().map(|(_, t)| t.as_str()).collect();
        assert!(texts.contains(&"->"));
        assert!(texts.contains(&"+="));
        assert!(texts.contains(&"=="));
    }

    #[test]
    fn number_suffixes_are_consumed() {
        let toks = kinds_and_texts("3.0f 10u 2.5");
        assert_eq!(toks[0], (TokenKind::Number, "3.0f".into()));
        assert_eq!(toks[1], (TokenKind::Number, "10u".into()));
        assert_eq!(toks[2], (TokenKind::Number, "2.5".into()));
    }

    #[test]
    fn keywords_need_a_word_boundary() {
        let toks = kinds_and_texts("for formula while whileX");
        assert_eq!(toks[0], (TokenKind::Keyword, "for".into()));
        assert_eq!(toks[1], (TokenKind::Identifier, "formula".into()));
        assert_eq!(toks[2], (TokenKind::Keyword, "while".into()));
        assert_eq!(toks[3], (TokenKind::Identifier, "whileX".into()));
    }

    #[test]
    fn string_with_escaped_quote() {
        let toks = kinds_and_texts(r#"x = "a\"b";"#);
        assert!(toks
            .iter()
            .any(|(k, t)| *k == TokenKind::String && t == r#""a\"b""#));
    }

    #[test]
    fn newlines_bump_the_line_counter() {
        let source = "int a;\nint b;\n\nint c;";
        let tokens = tokenize(source);
        let line_of = |name: &str| {
            tokens
                .iter()
                .find(|t| t.text(source) == name)
                .map(|t| t.line)
                .unwrap()
        };
        assert_eq!(line_of("a"), 1);
        assert_eq!(line_of("b"), 2);
        assert_eq!(line_of("c"), 4);
    }

    #[test]
    fn scope_resolution_is_one_token() {
        let toks = kinds_and_texts("math::abs(x)");
        assert_eq!(toks[1], (TokenKind::Punctuation, "::".into()));
    }
}
