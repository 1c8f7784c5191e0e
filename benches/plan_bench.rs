//! Benchmarks for building execution plans.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_yaml::Value;
use sim2sumo::config::{ConfigNormalizer, DatatypeRegistry, Overrides, RawConfig};
use sim2sumo::planner::Planner;
use std::fs;
use tempfile::TempDir;

/// Create `count` datafiles spread over simulator folders
fn create_runpath(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for i in 0..count {
        let simulator = ["eclipse", "opm", "ix"][i % 3];
        let dir = temp_dir.path().join(simulator).join("model");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(format!("CASE_{:03}-0.DATA", i)), b"RUNSPEC\n").unwrap();
    }
    temp_dir
}

/// Benchmark normalization alone (no filesystem access)
fn bench_normalize(c: &mut Criterion) {
    let section: Value = serde_yaml::from_str(
        r#"
datafile:
  eclipse/model/A.DATA: [summary, rft]
  opm/model/B.DATA:
    summary:
      column_keys: [FOPT, FOPR, FWPT]
    grid:
      rstprops: [SWAT, PRESSURE]
  ix/model/C.afi: all
datatypes: all
options:
  arrow: true
"#,
    )
    .unwrap();
    let registry = DatatypeRegistry::standard();

    c.bench_function("normalize_section", |b| {
        b.iter(|| {
            let raw = RawConfig::from_section(Some(black_box(&section))).unwrap();
            ConfigNormalizer::new(&registry)
                .normalize(&raw, &Overrides::default())
                .unwrap()
        });
    });
}

/// Benchmark discovery and planning for different runpath sizes
fn bench_plan_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_discovery");
    let registry = DatatypeRegistry::standard();
    let section: Value = serde_yaml::from_str("datatypes: all").unwrap();

    for count in [1, 10, 50] {
        let runpath = create_runpath(count);
        group.bench_with_input(BenchmarkId::new("datafiles", count), &runpath, |b, runpath| {
            b.iter(|| {
                Planner::new(&registry, runpath.path())
                    .plan_section(Some(&section), &Overrides::default())
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_plan_discovery);
criterion_main!(benches);
