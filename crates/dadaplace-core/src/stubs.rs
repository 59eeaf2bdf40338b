//! # Image Capability Stubs
//!
//! Placeholders for the image features of the wardrobe: recognising a piece
//! from a photo, cutting it out of the background and dressing a virtual
//! model. None of them process pixels. They return fixed answers so that
//! the add-item and try-on flows can run end to end.

use crate::primitives::VIRTUAL_MODEL_PLACEHOLDER;
use crate::types::{Category, ClothingItem, UserProfile};
use std::path::{Path, PathBuf};
use tracing::info;

/// Category and base color guessed from a photo.
///
/// Always a white top.
#[must_use]
pub fn analyze_clothing_image(path: &Path) -> (Category, String) {
    info!(path = %path.display(), "analyzing clothing image");
    (Category::Top, "white".to_string())
}

/// Path of the background-free cut-out. Returns the input unchanged.
#[must_use]
pub fn crop_clothing_image(path: &Path) -> PathBuf {
    info!(path = %path.display(), "cropping clothing image");
    path.to_path_buf()
}

/// Image of the profile's virtual model wearing `items`.
#[must_use]
pub fn render_virtual_model(items: &[ClothingItem], profile: &UserProfile) -> String {
    info!(
        user = %profile.id,
        items = items.len(),
        "rendering virtual model"
    );
    VIRTUAL_MODEL_PLACEHOLDER.to_string()
}
