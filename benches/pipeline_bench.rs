use criterion::{black_box, criterion_group, criterion_main, Criterion};
use git_count::filter::CommitFilter;
use git_count::model::Period;
use git_count::parse::{parse_log, FIELD_SEP, RECORD_SEP};
use git_count::report::{build_report, ReportOptions};

fn synthetic_log(commits: usize) -> String {
    let authors = ["Alice", "Bob", "Carol", "Dave"];
    let messages = ["fix crash", "feat: search", "docs", "refactor io", "bump deps"];
    let mut out = String::new();
    for i in 0..commits {
        let day = 1 + (i % 28);
        let month = 1 + (i / 28) % 12;
        out.push(RECORD_SEP);
        out.push_str(&format!(
            "{i:040x}{FIELD_SEP}{author}{FIELD_SEP}2023-{month:02}-{day:02}T{hour:02}:15:00+01:00{FIELD_SEP}{msg}\n\n",
            author = authors[i % authors.len()],
            hour = i % 24,
            msg = messages[i % messages.len()],
        ));
        for f in 0..(i % 4 + 1) {
            out.push_str(&format!("{}\t{}\tsrc/mod{}/file{}.rs\n", i % 50, i % 7, f, i % 13));
        }
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let log = synthetic_log(5_000);

    c.bench_function("parse_log_5k", |b| b.iter(|| parse_log(black_box(&log))));

    let parsed = parse_log(&log);
    let options = ReportOptions {
        period: Period::Week,
        insights: true,
        churn: true,
        velocity: true,
        heatmap: true,
        sparkline: true,
        boxplot: true,
        violinplot: true,
        ..ReportOptions::default()
    };

    c.bench_function("filter_and_report_5k", |b| {
        b.iter(|| {
            let series = CommitFilter::new()
                .with_directory("src/mod1")
                .apply(parsed.series.clone());
            build_report(black_box(&series), parsed.parse_errors, &options)
        })
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
