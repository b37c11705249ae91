use criterion::{black_box, criterion_group, criterion_main, Criterion};

use bandmark_core::model::TestModule;
use bandmark_core::parser::{parse_test_str, validate_test};

fn bench_toml_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("toml_parsing");

    let small_toml = generate_key_toml(13);
    let full_toml = generate_key_toml(40);

    group.bench_function("13_questions", |b| {
        b.iter(|| {
            parse_test_str(
                black_box(&small_toml),
                black_box("bench.toml".as_ref()),
                TestModule::AcademicReading,
            )
        })
    });

    group.bench_function("40_questions", |b| {
        b.iter(|| {
            parse_test_str(
                black_box(&full_toml),
                black_box("bench.toml".as_ref()),
                TestModule::AcademicReading,
            )
        })
    });

    group.finish();
}

fn bench_validation(c: &mut Criterion) {
    let test = parse_test_str(
        &generate_key_toml(40),
        "bench.toml".as_ref(),
        TestModule::AcademicReading,
    )
    .unwrap();

    c.bench_function("validate_40_questions", |b| {
        b.iter(|| validate_test(black_box(&test)))
    });
}

fn generate_key_toml(n: usize) -> String {
    let mut s = String::new();
    s.push_str(
        r#"[test]
id = "bench"
title = "Benchmark"
module = "academic-reading"
"#,
    );
    let mut i = 1;
    while i <= n {
        if i % 10 == 0 && i < n {
            s.push_str(&format!(
                r#"
[[questions]]
id = "{i}"
pair = ["B", "D"]
partner = "{next}"

[[questions]]
id = "{next}"
pair = ["B", "D"]
partner = "{i}"
"#,
                next = i + 1
            ));
            i += 2;
        } else {
            s.push_str(&format!(
                r#"
[[questions]]
id = "{i}"
answer = "the answer {i} / answer {i}"
"#
            ));
            i += 1;
        }
    }
    s
}

criterion_group!(benches, bench_toml_parsing, bench_validation);
criterion_main!(benches);
