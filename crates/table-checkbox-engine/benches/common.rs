// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_task_table(rows: usize) -> String {
    let mut content = String::from("# Tasks\n\n| task | owner | done |\n|------|-------|------|\n");
    for row in 0..rows {
        let marker = match row % 4 {
            0 => "- [ ]",
            1 => "-[]",
            2 => "- []",
            _ => "-[ ]",
        };
        content.push_str(&format!("| task {row} | someone | {marker} |\n"));
    }
    content.push_str("\n- [ ] a list item outside the table\n");
    content
}

#[allow(dead_code)]
pub fn generate_converted_table(rows: usize) -> String {
    table_checkbox_engine::convert_all(
        &generate_task_table(rows),
        table_checkbox_engine::ConversionPolicy::default(),
    )
    .text
}
