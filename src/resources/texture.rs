//! Fetching raw asset bytes and decoding images.

use crate::{
    data_structures::texture::decode_image,
    error::AssetLoadError,
    materials::TextureKey,
};

/// Resolves an asset path against `<origin>/assets/`.
#[cfg(target_arch = "wasm32")]
pub fn asset_url(file_name: &str) -> Result<reqwest::Url, AssetLoadError> {
    let origin = web_sys::window()
        .and_then(|window| window.location().origin().ok())
        .ok_or_else(|| AssetLoadError::fetch(file_name, "no window origin"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))
        .map_err(|e| AssetLoadError::fetch(file_name, e))?;
    base.join(file_name)
        .map_err(|e| AssetLoadError::fetch(file_name, e))
}

pub async fn load_binary(file_name: &str) -> Result<Vec<u8>, AssetLoadError> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = asset_url(file_name)?;
        let response = reqwest::get(url)
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| AssetLoadError::fetch(file_name, e))?;
        response
            .bytes()
            .await
            .map_err(|e| AssetLoadError::fetch(file_name, e))?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| AssetLoadError::fetch(file_name, e))?
    };

    log::debug!("fetched {} ({} bytes)", file_name, data.len());
    Ok(data)
}

/// Fetches and decodes one of the scene's textures.
pub async fn load_image(key: TextureKey) -> Result<image::DynamicImage, AssetLoadError> {
    let path = key.path();
    let bytes = load_binary(path).await?;
    decode_image(path, &bytes)
}
