// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
#[allow(dead_code)]
pub fn generate_note(size: usize) -> String {
    let base = "# Title\n\nParagraph with [[notes/plan.md|a link]], an ![[photo.png]] and #work/urgent tags.\n\n- **Bullet** point\n  - Nested _item_\n- Another item #todo\n\n![one](a.png)\n\n![two](b.png)\n\n```rust\nfn example() {\n    println!(\"[[not a link]]\");\n}\n```\n\n";
    base.repeat(size)
}
