use std::path::PathBuf;

use form_relay::PageDocument;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture(name: &str) -> PageDocument {
    PageDocument::load(&fixture_path(name)).expect("fixture should load")
}
