//! `protocodec test`: run golden test fixture files.
//!
//! Fixture format (JSON):
//! ```json
//! {
//!   "description": "TokenMapping with both string fields set",
//!   "type": "cronos.TokenMapping",
//!   "json": { "denom": "basecro", "contract": "0xAbC123" },
//!   "hex": "0a076261736563726f12083078416243313233"
//! }
//! ```
//!
//! Each fixture passes when its JSON encodes to exactly `hex` and `hex`
//! decodes back to the same record.

use anyhow::Result;
use protocodec_core::Codec;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Deserialize)]
struct Fixture {
    description: Option<String>,
    #[serde(rename = "type")]
    type_name: String,
    json: serde_json::Value,
    hex: String,
}

pub fn run(codec: &Codec, fixtures_dir: &str, type_filter: Option<&str>, verbose: bool) -> Result<()> {
    let dir = Path::new(fixtures_dir);
    if !dir.exists() {
        println!("Fixtures directory '{fixtures_dir}' not found, skipping");
        return Ok(());
    }

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut skipped = 0usize;

    let fixture_paths = collect_json_files(dir);

    for path in &fixture_paths {
        let fixture = match load_fixture(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("  ✗ {}: {e}", path.display());
                failed += 1;
                continue;
            }
        };

        if type_filter.is_some_and(|t| t != fixture.type_name) {
            skipped += 1;
            continue;
        }

        let desc = fixture.description.as_deref().unwrap_or(&fixture.type_name);
        let errors = check(codec, &fixture);

        if errors.is_empty() {
            println!("  ✓ {desc}");
            if verbose {
                println!("      {} ({} bytes)", fixture.type_name, fixture.hex.len() / 2);
            }
            passed += 1;
        } else {
            eprintln!("  ✗ {desc}");
            for e in &errors {
                eprintln!("      {e}");
            }
            failed += 1;
        }
    }

    println!();
    println!(
        "Results: {passed} passed, {failed} failed, {skipped} skipped  (total fixtures: {})",
        fixture_paths.len()
    );

    if failed > 0 {
        anyhow::bail!("{failed} fixture(s) failed");
    }
    Ok(())
}

fn load_fixture(path: &Path) -> Result<Fixture> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn check(codec: &Codec, fixture: &Fixture) -> Vec<String> {
    let mut errors = Vec::new();

    let expected = match hex::decode(fixture.hex.trim_start_matches("0x")) {
        Ok(b) => b,
        Err(e) => return vec![format!("invalid hex: {e}")],
    };
    let record = match codec.from_json(&fixture.type_name, &fixture.json) {
        Ok(r) => r,
        Err(e) => return vec![format!("from_json: {e}")],
    };

    match codec.encode(&record) {
        Ok(bytes) if bytes.as_ref() == expected.as_slice() => {}
        Ok(bytes) => errors.push(format!(
            "encode: got {}, want {}",
            hex::encode(&bytes),
            hex::encode(&expected)
        )),
        Err(e) => errors.push(format!("encode: {e}")),
    }

    match codec.decode(&fixture.type_name, &expected) {
        Ok(decoded) if decoded == record => {}
        Ok(decoded) => errors.push(format!("decode: got {decoded}, want {record}")),
        Err(e) => errors.push(format!("decode: {e}")),
    }
    errors
}

fn collect_json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}
