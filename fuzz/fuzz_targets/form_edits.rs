#![no_main]

use arbitrary::Arbitrary;
use formsync_core::{ChangeEvent, FieldMapping};
use formsync_runtime::Form;
use libfuzzer_sys::fuzz_target;
use serde_json::json;

const FIELDS: [&str; 6] = ["a", "b", "tags", "inputType", "discountValue", "array"];

#[derive(Arbitrary, Debug)]
enum Op {
    Change { field: u8, value: i8 },
    Code { code: u8 },
    Toggle { field: u8, value: i8 },
    Set { field: u8, value: i8 },
    Refresh { field: u8, value: i8 },
    Reset,
    Submit,
    TriggerChange,
}

fn field(idx: u8) -> &'static str {
    // Index past the table hits an unknown field.
    FIELDS.get(idx as usize % (FIELDS.len() + 1)).copied().unwrap_or("unknown")
}

fn initial() -> FieldMapping {
    FieldMapping::from_value(json!({
        "a": 0,
        "b": "x",
        "tags": [1, 2],
        "inputType": "",
        "discountValue": "",
        "array": [{ "key": "DISCOUNT_CODE4000", "value": "15" }]
    }))
    .unwrap_or_default()
}

fuzz_target!(|ops: Vec<Op>| {
    let start = initial();
    let mut upstream = start.clone();
    let mut form = Form::new(start.clone(), |_| {});

    for op in ops {
        match op {
            Op::Change { field: f, value } => form.change(ChangeEvent::new(field(f), value)),
            Op::Code { code } => {
                let code = format!("DISCOUNT_CODE40{:02}", code % 50);
                form.change(ChangeEvent::new("inputType", code));
            }
            Op::Toggle { field: f, value } => form.toggle_value(ChangeEvent::new(field(f), value)),
            Op::Set { field: f, value } => {
                let mut partial = FieldMapping::new();
                partial.insert(field(f), json!(value));
                form.set(partial);
            }
            Op::Refresh { field: f, value } => {
                upstream.insert(field(f), json!(value));
                form.refresh(upstream.clone());
            }
            Op::Reset => form.reset(),
            Op::Submit => form.submit(),
            Op::TriggerChange => form.trigger_change(),
        }

        assert!(form.data().same_keys(&start));
    }
});
