//! Benchmark for conversions between FNF charts and simfiles.

use criterion::Criterion;
use fnf_sm_rs::prelude::*;
use std::{collections::BTreeMap, sync::LazyLock};

const FILES_DIR: &str = "tests/files";

fn read_files(extension: &str) -> BTreeMap<String, String> {
    std::fs::read_dir(FILES_DIR)
        .expect("Failed to read directory")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == extension))
        .filter_map(|path| {
            let name = path.file_stem()?.to_str()?.to_owned();
            let source = std::fs::read_to_string(&path).expect("Failed to load chart file");
            Some((name, source))
        })
        .collect()
}

static CHARTS: LazyLock<BTreeMap<String, FnfChart>> = LazyLock::new(|| {
    read_files("json")
        .into_iter()
        .map(|(name, source)| (name, parse_fnf(&source).expect("Failed to parse chart")))
        .collect()
});

static SIMFILES: LazyLock<BTreeMap<String, String>> = LazyLock::new(|| read_files("sm"));

fn bench_fnf_to_sm(c: &mut Criterion) {
    let mut group = c.benchmark_group("fnf_to_sm");
    let config = ForwardConfig::default();

    for (name, chart) in CHARTS.iter() {
        let charts = [(Difficulty::Medium, chart.clone())];
        group.bench_function(name, |b| {
            b.iter(|| {
                fnf_to_sm(std::hint::black_box(&charts), &config)
                    .map(|output| output.simfile.to_string())
            });
        });
    }

    group.finish();
}

fn bench_sm_to_fnf(c: &mut Criterion) {
    let mut group = c.benchmark_group("sm_to_fnf");

    for (name, source) in SIMFILES.iter() {
        let simfile = parse_sm(source).expect("Failed to parse simfile").simfile;
        group.bench_function(format!("parse_{name}"), |b| {
            b.iter(|| parse_sm(std::hint::black_box(source)));
        });
        for difficulty in simfile.difficulties() {
            let config = ReverseConfig::default().difficulty(difficulty);
            group.bench_function(format!("{name}_{difficulty}"), |b| {
                b.iter(|| sm_to_fnf(std::hint::black_box(&simfile), &config));
            });
        }
    }

    group.finish();
}

fn main() {
    let mut criterion = Criterion::default();
    bench_fnf_to_sm(&mut criterion);
    bench_sm_to_fnf(&mut criterion);
}
