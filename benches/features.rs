//! Feature extraction benchmark: SQLite aggregations → one feature vector.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dropout_risk::features::{dropout_score, FeatureExtractor};
use dropout_risk::records::{AcademicRecord, ResultStatus, Student, StudentId};
use dropout_risk::storage::RecordStore;
use std::sync::Arc;

fn seeded_store(students: usize) -> RecordStore {
    let store = RecordStore::open_in_memory().unwrap();
    for i in 0..students {
        let id = StudentId::parse(&format!("bench-{}", i)).unwrap();
        store
            .insert_student(&Student {
                id: id.clone(),
                name: format!("Student {}", i),
                roll_no: format!("R{}", i),
                email: format!("s{}@college.edu", i),
            })
            .unwrap();
        for sem in 1..=4u32 {
            for subj in 0..6u32 {
                let failed = (i as u32 + sem + subj) % 11 == 0;
                store
                    .insert_academic(
                        &id,
                        sem,
                        &AcademicRecord {
                            subject: format!("S{}-{}", sem, subj),
                            grade: if failed { "F" } else { "B" }.to_string(),
                            grade_point: if failed { 0.0 } else { 7.0 },
                            credits_earned: if failed { 0.0 } else { 4.0 },
                            result_status: if failed {
                                ResultStatus::Fail
                            } else {
                                ResultStatus::Pass
                            },
                        },
                    )
                    .unwrap();
                store
                    .insert_attendance(&id, sem, &format!("S{}-{}", sem, subj), 40, 28 + (i as u32 % 12))
                    .unwrap();
            }
            store.insert_fee(&id, sem, 50_000.0, (i % 5) as f64 * 10_000.0).unwrap();
        }
    }
    store
}

fn bench_extract(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(Arc::new(seeded_store(50)));
    let id = StudentId::parse("bench-7").unwrap();

    c.bench_function("extract_features_24_subjects", |b| {
        b.iter(|| black_box(extractor.extract(black_box(&id))).unwrap())
    });
}

fn bench_score(c: &mut Criterion) {
    let extractor = FeatureExtractor::new(Arc::new(seeded_store(1)));
    let fv = extractor.extract(&StudentId::parse("bench-0").unwrap()).unwrap();

    c.bench_function("dropout_score", |b| b.iter(|| black_box(dropout_score(black_box(&fv)))));
}

criterion_group!(benches, bench_extract, bench_score);
criterion_main!(benches);
