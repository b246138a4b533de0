use anyhow::Result;

use platefind_core::{Catalog, Config};

pub fn run(config: Config) -> Result<()> {
    let data_dir = config.store.data_dir.clone();
    let endpoint = config.embedding.endpoint.clone();
    let catalog = Catalog::open_with_config(config)?;

    let (image_vectors, text_vectors) = catalog.vector_counts();

    println!("Catalog: {}", data_dir.display());
    println!("  Documents:     {}", catalog.len());
    println!("  Image vectors: {image_vectors}");
    println!("  Text vectors:  {text_vectors}");
    println!("  Dimension:     {}", catalog.dimension());
    println!("  Embedder:      {endpoint}");

    Ok(())
}
