#![no_main]
use libfuzzer_sys::fuzz_target;
use spelunk_path::Lexer;
use spelunk_path::TokenKind;

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(tokens) = Lexer::new(query).lex() {
        // the stream always terminates with Eof and spans stay in bounds
        assert_eq!(tokens.last().map(|t| t.kind()), Some(TokenKind::Eof));
        for token in &tokens {
            assert!(token.span().end <= query.len());
        }
    }
});
