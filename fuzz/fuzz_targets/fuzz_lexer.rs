#![no_main]

use eswalk::lexer::{Lexer, TokenKind};
use eswalk::string_dict::StringDict;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    if source.len() > 100_000 {
        return;
    }

    let mut dict = StringDict::new();
    let mut lexer = Lexer::new(source, &mut dict);

    // Consume all tokens - should never panic
    loop {
        let token = lexer.next_token();
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
    }
});
