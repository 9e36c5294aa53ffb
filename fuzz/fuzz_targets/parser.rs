#![no_main]
use libfuzzer_sys::fuzz_target;
use spelunk_path::Parser;

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(path) = Parser::new(query).parse() {
        // the canonical rendering must parse back to the same tree
        let rendered = path.to_string();
        let reparsed = Parser::new(&rendered)
            .parse()
            .expect("canonical rendering parses");
        assert_eq!(path, reparsed);
    }
});
