#![no_main]

use formsync_core::FieldMapping;
use formsync_state::PreserveLocalEdits;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(docs) = serde_json::from_str::<[serde_json::Value; 3]>(text) else {
        return;
    };
    let [prev, current, next] = docs;
    let (Ok(prev), Ok(current), Ok(next)) = (
        FieldMapping::from_value(prev),
        FieldMapping::from_value(current),
        FieldMapping::from_value(next),
    ) else {
        return;
    };

    let (merged, report) = PreserveLocalEdits.merge(&prev, &current, &next);
    assert!(merged.same_keys(&current));
    assert_eq!((report.retained + report.adopted) as usize, current.len());
});
