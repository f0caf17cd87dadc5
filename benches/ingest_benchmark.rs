use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diet_gateway::services::{build_prompt, BatchIngestor};

const GOALS: [&str; 4] = ["weight loss", "muscle gain", "maintenance", "heart health"];
const DIETS: [&str; 3] = ["vegetarian", "keto", "mediterranean"];

/// Build an upload of `rows` data rows, every tenth one with a bad age.
fn synthetic_upload(rows: usize) -> String {
    let mut csv = String::from("Name,Phone,Age,Gender,Goal,BMI,Diet Type,Duration\n");
    for i in 0..rows {
        let age = if i % 10 == 9 {
            "unknown".to_string()
        } else {
            (20 + i % 50).to_string()
        };
        csv.push_str(&format!(
            "user{i},555{i:07},{age},{},{},{:.1},{},{} days\n",
            if i % 2 == 0 { "female" } else { "male" },
            GOALS[i % GOALS.len()],
            18.5 + (i % 150) as f64 / 10.0,
            DIETS[i % DIETS.len()],
            7 * (1 + i % 4),
        ));
    }
    csv
}

fn benchmark_ingest(c: &mut Criterion) {
    let upload = synthetic_upload(1_000);

    let mut group = c.benchmark_group("bulk_upload");

    group.bench_function("parse_rows", |b| {
        b.iter(|| {
            BatchIngestor::parse(black_box(upload.as_bytes()))
                .expect("Failed to parse header")
                .count()
        })
    });

    group.bench_function("parse_validate_prompt", |b| {
        b.iter(|| {
            BatchIngestor::parse(black_box(upload.as_bytes()))
                .expect("Failed to parse header")
                .filter_map(|row| row.ok()?.into_profile().ok())
                .filter_map(|profile| build_prompt(&profile).ok())
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_ingest);
criterion_main!(benches);
