use std::path::Path;

pub const GOOGLE_DOCS_FIXTURE: &str = "tests/fixtures/google-docs.html";
pub const WORD_FIXTURE: &str = "tests/fixtures/word.html";
pub const CHATGPT_FIXTURE: &str = "tests/fixtures/chatgpt.md";
/// The HTML half of a ChatGPT copy: layout only, no emphasis tags.
pub const CHATGPT_HTML_FIXTURE: &str = "tests/fixtures/chatgpt.html";

pub const HTML_FIXTURES: &[&str] = &[GOOGLE_DOCS_FIXTURE, WORD_FIXTURE];

pub fn read_fixture(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {}", path, e))
}

/// Every fixture file present under `tests/fixtures`, sorted.
pub fn discover_fixtures() -> Vec<String> {
    let mut out = Vec::new();
    let Ok(entries) = std::fs::read_dir(Path::new("tests/fixtures")) else {
        return out;
    };
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("md"))
        {
            out.push(path.to_string_lossy().into_owned());
        }
    }
    out.sort();
    out
}
