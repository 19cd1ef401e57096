//! Image CDN URL construction.
//!
//! Asset references look like `image-<assetId>-<width>x<height>-<ext>`; the
//! CDN serves them at
//! `https://cdn.sanity.io/images/<project>/<dataset>/<assetId>-<width>x<height>.<ext>`.

use thiserror::Error;

use super::types::ImageAssetRef;

const CDN_BASE: &str = "https://cdn.sanity.io/images";

/// An asset reference that does not follow the `image-id-dims-ext` shape.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed image asset reference: {0}")]
pub struct BadAssetRef(String);

/// Builds CDN URLs for image assets of one project/dataset.
#[derive(Debug, Clone)]
pub struct ImageUrlBuilder {
    project_id: String,
    dataset: String,
}

impl ImageUrlBuilder {
    #[must_use]
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    /// Full-size URL for an asset reference.
    ///
    /// # Errors
    ///
    /// Returns `BadAssetRef` if the reference cannot be parsed.
    pub fn url(&self, asset: &ImageAssetRef) -> Result<String, BadAssetRef> {
        let (id, dims, ext) = split_ref(&asset.id)?;
        Ok(format!(
            "{CDN_BASE}/{}/{}/{id}-{dims}.{ext}",
            self.project_id, self.dataset
        ))
    }

    /// URL resized to `width` pixels (auto format negotiation).
    ///
    /// # Errors
    ///
    /// Returns `BadAssetRef` if the reference cannot be parsed.
    pub fn url_with_width(&self, asset: &ImageAssetRef, width: u32) -> Result<String, BadAssetRef> {
        Ok(format!("{}?w={width}&auto=format", self.url(asset)?))
    }
}

/// Split `image-<assetId>-<dims>-<ext>` into its parts.
fn split_ref(raw: &str) -> Result<(&str, &str, &str), BadAssetRef> {
    let body = raw
        .strip_prefix("image-")
        .ok_or_else(|| BadAssetRef(raw.to_string()))?;
    // The extension and dimensions are the last two dash-separated segments;
    // the asset ID itself never contains dashes.
    let (rest, ext) = body
        .rsplit_once('-')
        .ok_or_else(|| BadAssetRef(raw.to_string()))?;
    let (id, dims) = rest
        .rsplit_once('-')
        .ok_or_else(|| BadAssetRef(raw.to_string()))?;
    if id.is_empty() || !dims.contains('x') || ext.is_empty() {
        return Err(BadAssetRef(raw.to_string()));
    }
    Ok((id, dims, ext))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn asset(id: &str) -> ImageAssetRef {
        ImageAssetRef { id: id.to_string() }
    }

    #[test]
    fn builds_cdn_url() {
        let builder = ImageUrlBuilder::new("r3h9xffe", "production");
        let url = builder.url(&asset("image-abc123-800x600-jpg")).unwrap();
        assert_eq!(
            url,
            "https://cdn.sanity.io/images/r3h9xffe/production/abc123-800x600.jpg"
        );
    }

    #[test]
    fn builds_resized_url() {
        let builder = ImageUrlBuilder::new("r3h9xffe", "production");
        let url = builder
            .url_with_width(&asset("image-abc123-800x600-webp"), 400)
            .unwrap();
        assert!(url.ends_with("abc123-800x600.webp?w=400&auto=format"));
    }

    #[test]
    fn rejects_malformed_refs() {
        let builder = ImageUrlBuilder::new("p", "d");
        assert!(builder.url(&asset("file-abc-800x600-jpg")).is_err());
        assert!(builder.url(&asset("image-abc")).is_err());
        assert!(builder.url(&asset("image-abc-nodims-jpg")).is_err());
    }
}
