//! Resolves a scene's asset requests against the filesystem.

use std::fs;
use std::path::Path;

use arcade_core::assets::{AssetCatalog, AssetKind, AssetOrigin, AssetRequest, LoadedImage};

pub fn load_assets(requests: &[AssetRequest]) -> Result<AssetCatalog, String> {
    let mut catalog = AssetCatalog::new();
    for request in requests {
        match &request.kind {
            AssetKind::Image { path, fallback } => {
                let image = decode_image_file(Path::new(path)).unwrap_or_else(|err| {
                    log::warn!(
                        "{err}. Using {}x{} placeholder for '{}'.",
                        fallback.width,
                        fallback.height,
                        request.key
                    );
                    fallback.generate()
                });
                catalog.insert_image(request.key, image);
            }
            AssetKind::Generated(placeholder) => {
                catalog.insert_image(request.key, placeholder.generate());
            }
            AssetKind::Text { path } => {
                let text = fs::read_to_string(path)
                    .map_err(|e| format!("Failed to read '{}' ({path}): {e}", request.key))?;
                catalog.insert_text(request.key, text);
            }
        }
    }
    log::debug!(
        "Loaded {} assets ({} placeholders)",
        requests.len(),
        catalog.placeholder_count()
    );
    Ok(catalog)
}

pub fn decode_image_file(path: &Path) -> Result<LoadedImage, String> {
    let decoded = image::open(path)
        .map_err(|e| format!("Failed to load image {}: {e}", path.display()))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(LoadedImage {
        width,
        height,
        pixels: decoded.into_raw(),
        origin: AssetOrigin::File,
    })
}
