use std::path::Path;

use anyhow::{Context, Result, bail};

use platefind_core::embeddings::ImagePayload;
use platefind_core::{Catalog, Config, SearchQuery};

use crate::OutputFormat;

#[allow(clippy::too_many_arguments)]
pub fn run(
    config: Config,
    text: Option<&str>,
    image: Option<&Path>,
    limit: Option<usize>,
    image_weight: Option<f32>,
    text_weight: Option<f32>,
    format: OutputFormat,
) -> Result<()> {
    if text.is_none() && image.is_none() {
        bail!("provide a text query and/or --image <FILE>");
    }

    let image_payload = match image {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Some(ImagePayload::from_bytes(bytes))
        }
        None => None,
    };

    // A missing modality carries no weight unless the caller insists
    let image_weight = image_weight.unwrap_or(if image_payload.is_some() {
        config.search.image_weight
    } else {
        0.0
    });
    let text_weight = text_weight.unwrap_or(if text.is_some() {
        config.search.text_weight
    } else {
        0.0
    });

    let query = SearchQuery {
        text: text.map(str::to_string),
        image: image_payload,
        image_weight,
        text_weight,
    };

    tracing::debug!(
        "search: text={:?} image={:?} weights=({image_weight}, {text_weight})",
        text,
        image
    );

    let catalog = Catalog::open_with_config(config)?;
    if catalog.is_empty() {
        bail!("catalog is empty; run `platefind import <FILE>` first");
    }

    let result = catalog.search(&query, limit)?;

    match format {
        OutputFormat::Json => println!("{}", result.format_json()),
        OutputFormat::Pretty => println!("{}", result.format_pretty()),
    }

    Ok(())
}
