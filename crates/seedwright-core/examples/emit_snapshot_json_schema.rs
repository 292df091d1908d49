use schemars::schema_for;
use seedwright_core::RawTable;

fn main() {
    let schema = schema_for!(Vec<RawTable>);
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
