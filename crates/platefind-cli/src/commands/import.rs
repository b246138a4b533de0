use std::path::Path;

use anyhow::{Context, Result};

use platefind_core::{Catalog, Config, Document};

pub fn run(config: Config, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let docs: Vec<Document> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    if docs.is_empty() {
        println!("Nothing to import.");
        return Ok(());
    }

    let catalog = Catalog::open_with_config(config)?;
    let stats = catalog.import(docs)?;

    println!(
        "Imported {} documents ({} image vectors, {} text vectors).",
        stats.imported, stats.image_vectors, stats.text_vectors
    );
    if stats.skipped > 0 {
        println!("Skipped {} documents (see warnings).", stats.skipped);
    }

    Ok(())
}
