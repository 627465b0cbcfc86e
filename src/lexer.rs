//! Lexer for script source code
//!
//! Converts source text into a stream of tokens.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::string_dict::StringDict;
use crate::value::{JsString, PropertyKey};

/// Source span information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    Number(f64),
    String(JsString),
    True,
    False,
    Null,

    Identifier(PropertyKey),

    // Keywords
    Var,
    Function,
    Return,
    If,
    Else,
    For,
    While,
    Do,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Try,
    Catch,
    Finally,
    Throw,
    New,
    This,
    Typeof,
    Instanceof,
    In,
    Void,
    Delete,
    With,

    // Operators
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --
    Eq,         // =
    EqEq,       // ==
    EqEqEq,     // ===
    BangEq,     // !=
    BangEqEq,   // !==
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=
    LtLt,       // <<
    GtGt,       // >>
    GtGtGt,     // >>>
    Amp,        // &
    AmpAmp,     // &&
    Pipe,       // |
    PipePipe,   // ||
    Caret,      // ^
    Tilde,      // ~
    Bang,       // !
    Question,   // ?

    // Assignment Operators
    PlusEq,   // +=
    MinusEq,  // -=
    StarEq,   // *=
    SlashEq,  // /=
    PercentEq, // %=
    AmpEq,    // &=
    PipeEq,   // |=
    CaretEq,  // ^=
    LtLtEq,   // <<=
    GtGtEq,   // >>=
    GtGtGtEq, // >>>=

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    LBracket,  // [
    RBracket,  // ]
    Dot,       // .
    Comma,     // ,
    Colon,     // :
    Semicolon, // ;

    // Special
    Eof,
    Invalid(char),
}

impl TokenKind {
    /// The source text of a keyword token, used where the grammar accepts
    /// reserved words as property names (`obj.default`, `{ in: 1 }`).
    pub fn keyword_text(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Var => "var",
            TokenKind::Function => "function",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Try => "try",
            TokenKind::Catch => "catch",
            TokenKind::Finally => "finally",
            TokenKind::Throw => "throw",
            TokenKind::New => "new",
            TokenKind::This => "this",
            TokenKind::Typeof => "typeof",
            TokenKind::Instanceof => "instanceof",
            TokenKind::In => "in",
            TokenKind::Void => "void",
            TokenKind::Delete => "delete",
            TokenKind::With => "with",
            _ => return None,
        })
    }
}

/// A token with its source location
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn eof(pos: usize, line: u32, column: u32) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: Span::new(pos, pos, line, column),
        }
    }
}

/// Lexer state checkpoint for backtracking
#[derive(Clone)]
pub struct LexerCheckpoint {
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    saw_newline: bool,
}

/// Lexer for tokenizing source code
pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
    /// Base offset added to char_indices positions after a restore
    chars_base_offset: usize,
    current_pos: usize,
    line: u32,
    column: u32,
    start_pos: usize,
    start_line: u32,
    start_column: u32,
    /// Tracks if we just saw a newline (for ASI)
    saw_newline: bool,
    string_dict: &'a mut StringDict,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, string_dict: &'a mut StringDict) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            chars_base_offset: 0,
            current_pos: 0,
            line: 1,
            column: 1,
            start_pos: 0,
            start_line: 1,
            start_column: 1,
            saw_newline: false,
            string_dict,
        }
    }

    pub fn string_dict(&mut self) -> &mut StringDict {
        self.string_dict
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            current_pos: self.current_pos,
            line: self.line,
            column: self.column,
            start_pos: self.start_pos,
            start_line: self.start_line,
            start_column: self.start_column,
            saw_newline: self.saw_newline,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.current_pos = checkpoint.current_pos;
        self.line = checkpoint.line;
        self.column = checkpoint.column;
        self.start_pos = checkpoint.start_pos;
        self.start_line = checkpoint.start_line;
        self.start_column = checkpoint.start_column;
        self.saw_newline = checkpoint.saw_newline;
        self.chars_base_offset = checkpoint.current_pos;
        self.chars = self
            .source
            .get(checkpoint.current_pos..)
            .unwrap_or("")
            .char_indices()
            .peekable();
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        self.start_pos = self.current_pos;
        self.start_line = self.line;
        self.start_column = self.column;

        let Some((_pos, ch)) = self.advance() else {
            return Token::eof(self.current_pos, self.line, self.column);
        };

        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            ':' => TokenKind::Colon,
            '?' => TokenKind::Question,

            '.' => self.scan_dot(),
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_with_eq(TokenKind::Star, TokenKind::StarEq),
            '/' => self.scan_with_eq(TokenKind::Slash, TokenKind::SlashEq),
            '%' => self.scan_with_eq(TokenKind::Percent, TokenKind::PercentEq),
            '^' => self.scan_with_eq(TokenKind::Caret, TokenKind::CaretEq),
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),

            '"' | '\'' => self.scan_string(ch),

            '0'..='9' => self.scan_number(ch),

            c if is_id_start(c) => self.scan_identifier(c),

            c => TokenKind::Invalid(c),
        };

        Token::new(kind, self.make_span())
    }

    /// Check if there was a newline before the current token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = self.chars_base_offset + pos + ch.len_utf8();
            if is_line_terminator(ch) {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let slice = self.source.get(self.current_pos..)?;
        let mut iter = slice.chars();
        iter.next();
        iter.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn make_span(&self) -> Span {
        Span::new(
            self.start_pos,
            self.current_pos,
            self.start_line,
            self.start_column,
        )
    }

    fn skip_whitespace_and_comments(&mut self) {
        self.saw_newline = false;

        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\u{000B}' | '\u{000C}' | '\u{00A0}' | '\u{FEFF}') => {
                    self.advance();
                }
                Some('\n' | '\u{2028}' | '\u{2029}') => {
                    self.saw_newline = true;
                    self.advance();
                }
                Some('/') => {
                    let next = self.peek_next();
                    if next == Some('/') {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if is_line_terminator(ch) {
                                break;
                            }
                            self.advance();
                        }
                    } else if next == Some('*') {
                        self.advance();
                        self.advance();
                        loop {
                            match self.advance() {
                                Some((_, '*')) if self.peek() == Some('/') => {
                                    self.advance();
                                    break;
                                }
                                Some((_, c)) if is_line_terminator(c) => {
                                    self.saw_newline = true;
                                }
                                Some(_) => {}
                                None => break,
                            }
                        }
                    } else {
                        break;
                    }
                }
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn scan_with_eq(&mut self, plain: TokenKind, with_eq: TokenKind) -> TokenKind {
        if self.match_char('=') {
            with_eq
        } else {
            plain
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if matches!(self.peek(), Some('0'..='9')) {
            self.scan_number('.')
        } else {
            TokenKind::Dot
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::BangEqEq
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            self.scan_with_eq(TokenKind::LtLt, TokenKind::LtLtEq)
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                self.scan_with_eq(TokenKind::GtGtGt, TokenKind::GtGtGtEq)
            } else {
                self.scan_with_eq(TokenKind::GtGt, TokenKind::GtGtEq)
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.match_char('&') {
            TokenKind::AmpAmp
        } else if self.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.match_char('|') {
            TokenKind::PipePipe
        } else if self.match_char('=') {
            TokenKind::PipeEq
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some((_, c)) if c == quote => break,
                Some((_, '\\')) => match self.advance() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'b')) => value.push('\x08'),
                    Some((_, 'f')) => value.push('\x0C'),
                    Some((_, 'v')) => value.push('\x0B'),
                    Some((_, '0')) if !matches!(self.peek(), Some('0'..='9')) => value.push('\0'),
                    Some((_, c @ '0'..='7')) => {
                        // Legacy octal escape, up to three digits
                        let mut code = c.to_digit(8).unwrap_or(0);
                        let mut digits = 1;
                        while digits < 3 {
                            match self.peek().and_then(|d| d.to_digit(8)) {
                                Some(d) if code * 8 + d <= 0o377 => {
                                    code = code * 8 + d;
                                    self.advance();
                                    digits += 1;
                                }
                                _ => break,
                            }
                        }
                        if let Some(ch) = char::from_u32(code) {
                            value.push(ch);
                        }
                    }
                    Some((_, 'x')) => match self.scan_hex_escape(2) {
                        Some(ch) => value.push(ch),
                        None => return TokenKind::Invalid('\\'),
                    },
                    Some((_, 'u')) => match self.scan_hex_escape(4) {
                        Some(ch) => value.push(ch),
                        None => return TokenKind::Invalid('\\'),
                    },
                    Some((_, '\r')) => {
                        self.match_char('\n');
                    }
                    Some((_, c)) if is_line_terminator(c) => {}
                    Some((_, c)) => value.push(c),
                    None => return TokenKind::Invalid(quote),
                },
                Some((_, c)) if is_line_terminator(c) => return TokenKind::Invalid(quote),
                Some((_, c)) => value.push(c),
                None => return TokenKind::Invalid(quote),
            }
        }

        TokenKind::String(self.string_dict.get_or_insert(&value).name().clone())
    }

    fn scan_hex_escape(&mut self, count: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            code = code * 16 + digit;
        }
        // Lone surrogates cannot be represented in a Rust string
        Some(char::from_u32(code).unwrap_or('\u{FFFD}'))
    }

    fn scan_digits(&mut self, radix: u32, out: &mut String) {
        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) {
                out.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut num_str = String::new();

        if first == '0' {
            match self.peek() {
                Some('x' | 'X') => {
                    self.advance();
                    self.scan_digits(16, &mut num_str);
                    if num_str.is_empty() {
                        return TokenKind::Invalid('x');
                    }
                    let value = num_str
                        .chars()
                        .filter_map(|c| c.to_digit(16))
                        .fold(0.0, |acc, d| acc * 16.0 + d as f64);
                    return TokenKind::Number(value);
                }
                Some('0'..='7') => {
                    // Legacy octal literal (0777)
                    self.scan_digits(10, &mut num_str);
                    if num_str.chars().all(|c| c.is_digit(8)) {
                        let value = num_str
                            .chars()
                            .filter_map(|c| c.to_digit(8))
                            .fold(0.0, |acc, d| acc * 8.0 + d as f64);
                        return TokenKind::Number(value);
                    }
                    // 089 style: decimal after all
                    num_str.insert(0, '0');
                    return TokenKind::Number(num_str.parse().unwrap_or(f64::NAN));
                }
                _ => num_str.push(first),
            }
        } else if first == '.' {
            num_str.push_str("0.");
        } else {
            num_str.push(first);
        }

        if first != '.' {
            self.scan_digits(10, &mut num_str);
            if self.peek() == Some('.') {
                self.advance();
                num_str.push('.');
            }
        }
        self.scan_digits(10, &mut num_str);

        if matches!(self.peek(), Some('e' | 'E')) {
            let sign_follows = matches!(self.peek_next(), Some('+' | '-'));
            let digit_follows = matches!(self.peek_next(), Some('0'..='9'));
            if sign_follows || digit_follows {
                num_str.push('e');
                self.advance();
                if sign_follows {
                    if let Some((_, sign)) = self.advance() {
                        num_str.push(sign);
                    }
                }
                self.scan_digits(10, &mut num_str);
            }
        }

        if num_str.ends_with('.') {
            num_str.push('0');
        }

        // An identifier may not immediately follow a numeric literal (3in)
        if matches!(self.peek(), Some(c) if is_id_start(c)) {
            return TokenKind::Invalid(first);
        }

        TokenKind::Number(num_str.parse().unwrap_or(f64::NAN))
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::new();
        name.push(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match name.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "for" => TokenKind::For,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "switch" => TokenKind::Switch,
            "case" => TokenKind::Case,
            "default" => TokenKind::Default,
            "try" => TokenKind::Try,
            "catch" => TokenKind::Catch,
            "finally" => TokenKind::Finally,
            "throw" => TokenKind::Throw,
            "new" => TokenKind::New,
            "this" => TokenKind::This,
            "typeof" => TokenKind::Typeof,
            "instanceof" => TokenKind::Instanceof,
            "in" => TokenKind::In,
            "void" => TokenKind::Void,
            "delete" => TokenKind::Delete,
            "with" => TokenKind::With,
            _ => TokenKind::Identifier(self.string_dict.get_or_insert(&name)),
        }
    }
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_id_start(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphabetic()
}

fn is_id_continue(ch: char) -> bool {
    ch == '$' || ch == '_' || ch.is_alphanumeric()
}
