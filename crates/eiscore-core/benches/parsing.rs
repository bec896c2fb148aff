use criterion::{black_box, criterion_group, criterion_main, Criterion};

use eiscore_core::model::ScaleDescriptor;
use eiscore_core::parser::parse_item_bank_str;

fn bench_scale_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("scale_descriptor");

    for input in ["graded", "binary", "0-4", "0..=2"] {
        group.bench_function(input, |b| {
            b.iter(|| black_box(input).parse::<ScaleDescriptor>())
        });
    }

    group.finish();
}

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_item_bank_toml(5);
    let medium_toml = generate_item_bank_toml(50);
    let large_toml = generate_item_bank_toml(200);

    group.bench_function("5_items", |b| {
        b.iter(|| parse_item_bank_str(black_box(&small_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("50_items", |b| {
        b.iter(|| parse_item_bank_str(black_box(&medium_toml), black_box("bench.toml".as_ref())))
    });

    group.bench_function("200_items", |b| {
        b.iter(|| parse_item_bank_str(black_box(&large_toml), black_box("bench.toml".as_ref())))
    });

    group.finish();
}

fn generate_item_bank_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[item_bank]
id = "bench"
name = "Benchmark"
default_scale = "graded"
"#,
    );
    for i in 0..n {
        if i % 2 == 0 {
            s.push_str(&format!(
                r#"
[[items]]
id = "passive_{i}"
construct = "be-passive"
target = "Children should not be allowed to stay out late {i}."
lemma = "allow"
form = "be"
lookahead = 2
"#
            ));
        } else {
            s.push_str(&format!(
                r#"
[[items]]
id = "3sg_{i}"
construct = "third-person-singular"
target = "Everyone loves to read comic books {i}."
lemma = "love"
form = "loves"
scale = "binary"
marking = "any-verb"
"#
            ));
        }
    }
    s
}

criterion_group!(benches, bench_scale_parsing, bench_toml_parsing);
criterion_main!(benches);
