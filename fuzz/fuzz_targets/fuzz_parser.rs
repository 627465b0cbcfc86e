#![no_main]

use eswalk::parser::Parser;
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
    let mut parser = Parser::new(source, &mut dict);

    // Parse should return Ok or Err, never panic
    let _ = parser.parse_program();
});
