use criterion::*;
use spelunk_path::Lexer;
use spelunk_path::Parser;

const QUERY: &str =
    "//class[B]/method[@async and not(.//await-expression)]/statement[last()-1]";

fn bench_path_lexer(c: &mut Criterion) {
    c.bench_function("path_lexer", move |b| {
        b.iter(|| {
            let tokens = Lexer::new(QUERY).lex().expect("query lexes");
            black_box(tokens);
        })
    });
}

fn bench_path_parser(c: &mut Criterion) {
    c.bench_function("path_parser", move |b| {
        b.iter(|| {
            let path = Parser::new(QUERY).parse().expect("query parses");
            black_box(path);
        })
    });
}

criterion_group!(benches, bench_path_lexer, bench_path_parser);
criterion_main!(benches);
