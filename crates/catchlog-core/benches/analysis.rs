//! Analysis stage benchmarks over generated Java projects.
//!
//! Run with: cargo bench -p catchlog-core --bench analysis

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use catchlog_core::{extract_records, link_units, JavaParser, ParsedSource};

fn synthetic_source(index: usize) -> String {
    format!(
        r#"package bench.gen;

import org.slf4j.Logger;
import org.slf4j.LoggerFactory;
import java.io.IOException;
import java.nio.file.Files;
import java.nio.file.Path;

public class Service{index} {{
    private static final Logger log = LoggerFactory.getLogger(Service{index}.class);

    public String load(Path file) {{
        try {{
            if (Files.exists(file)) {{
                return Files.readString(file);
            }}
        }} catch (IOException e) {{
            log.error("load {index} failed for {{}}", file, e);
        }}
        return "";
    }}

    void refresh(Path file) {{
        for (int i = 0; i < 3; i++) {{
            try {{
                Files.readAllBytes(file);
            }} catch (IOException e) {{
                log.warn("refresh attempt " + i + " failed: " + e.getMessage());
            }}
        }}
    }}
}}
"#,
        index = index
    )
}

fn parse_units(count: usize) -> Vec<ParsedSource> {
    let mut parser = JavaParser::default();
    (0..count)
        .map(|i| {
            parser
                .parse(format!("bench/Service{i}.java"), synthetic_source(i))
                .expect("generated source parses")
        })
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let sources: Vec<(String, String)> = (0..50)
        .map(|i| (format!("bench/Service{i}.java"), synthetic_source(i)))
        .collect();

    c.bench_function("parse_50_units", |b| {
        let mut parser = JavaParser::default();
        b.iter(|| {
            for (path, text) in &sources {
                let parsed = parser
                    .parse(path.clone(), text.clone())
                    .expect("generated source parses");
                black_box(parsed);
            }
        })
    });
}

fn bench_link_and_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(10);

    for size in [10usize, 50] {
        let parsed = parse_units(size);

        group.bench_with_input(
            BenchmarkId::new("link_units", size),
            &parsed,
            |b, parsed| b.iter(|| black_box(link_units(parsed))),
        );

        let (ws, resolver) = link_units(&parsed);
        group.bench_with_input(BenchmarkId::new("extract_records", size), &size, |b, _| {
            b.iter(|| black_box(extract_records(&ws, &resolver)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_link_and_extract);
criterion_main!(benches);
