//! Benchmarks for Formsync state operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use formsync_core::{ChangeEvent, FieldMapping};
use formsync_runtime::Form;
use formsync_state::{PreserveLocalEdits, RuleSet};
use serde_json::json;

fn wide_mapping(fields: usize, offset: i64) -> FieldMapping {
    (0..fields)
        .map(|i| (format!("f{i}"), json!(i as i64 + offset)))
        .collect()
}

fn bench_merge_snapshot(c: &mut Criterion) {
    let prev = wide_mapping(64, 0);
    let mut current = prev.clone();
    for i in (0..64).step_by(4) {
        current.insert(format!("f{i}"), json!(-1));
    }
    let mut next = prev.clone();
    for i in (0..64).step_by(3) {
        next.insert(format!("f{i}"), json!(1000));
    }

    c.bench_function("merge_snapshot_64", |b| {
        b.iter(|| black_box(PreserveLocalEdits.merge(&prev, black_box(&current), &next)))
    });
}

fn bench_change_plain(c: &mut Criterion) {
    let mut form = Form::new(wide_mapping(64, 0), |_| {});
    let mut n = 0i64;

    c.bench_function("form_change_plain", |b| {
        b.iter(|| {
            n += 1;
            form.change(black_box(ChangeEvent::new("f10", n)));
        })
    });
}

fn bench_change_with_rule(c: &mut Criterion) {
    let mut data = wide_mapping(16, 0);
    data.insert("inputType", json!(""));
    data.insert("discountValue", json!(""));
    data.insert(
        "array",
        json!([
            { "key": "DISCOUNT_CODE4000", "value": "15" },
            { "key": "DISCOUNT_CODE4040", "value": "40" }
        ]),
    );
    let mut form = Form::new(data, |_| {});

    c.bench_function("form_change_discount_code", |b| {
        b.iter(|| {
            form.change(black_box(ChangeEvent::new("inputType", "DISCOUNT_CODE4040")));
        })
    });
}

fn bench_rule_dispatch_miss(c: &mut Criterion) {
    let rules = RuleSet::discount_codes();
    let state = wide_mapping(16, 0);
    let value = json!("NOT_A_CODE");

    c.bench_function("rule_dispatch_miss", |b| {
        b.iter(|| black_box(rules.derive(&state, black_box("inputType"), &value)))
    });
}

criterion_group!(
    benches,
    bench_merge_snapshot,
    bench_change_plain,
    bench_change_with_rule,
    bench_rule_dispatch_miss,
);
criterion_main!(benches);
