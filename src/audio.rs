//! Background music started by the intro.

/// Looping background track.
#[derive(Debug)]
pub struct BackgroundAudio {
    path: String,
    #[cfg(target_arch = "wasm32")]
    element: Option<web_sys::HtmlAudioElement>,
    /// `play` has been called and went as far as the platform allows.
    requested: bool,
}

impl BackgroundAudio {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            #[cfg(target_arch = "wasm32")]
            element: None,
            requested: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// `true` while an audio element is attached. Never true natively, where
    /// nothing is played.
    #[cfg(target_arch = "wasm32")]
    pub fn is_playing(&self) -> bool {
        self.element.is_some()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn is_playing(&self) -> bool {
        false
    }

    /// Starts looping playback at full volume. Calling it again is a no-op.
    #[cfg(target_arch = "wasm32")]
    pub fn play(&mut self) {
        if self.requested {
            return;
        }
        let url = match crate::resources::texture::asset_url(&self.path) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };
        let element = match web_sys::HtmlAudioElement::new_with_src(&url) {
            Ok(element) => element,
            Err(e) => {
                log::error!("could not create audio element for {}: {:?}", url, e);
                return;
            }
        };
        element.set_loop(true);
        element.set_volume(1.0);
        // the returned promise rejects when autoplay is blocked; the click
        // that starts the intro counts as a user gesture
        if let Err(e) = element.play() {
            log::warn!("audio playback refused: {:?}", e);
        }
        self.element = Some(element);
        self.requested = true;
        log::info!("background audio started");
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn play(&mut self) {
        if self.requested {
            return;
        }
        self.requested = true;
        log::info!("audio playback is not supported natively, skipping {}", self.path);
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for BackgroundAudio {
    fn drop(&mut self) {
        if let Some(element) = &self.element {
            let _ = element.pause();
        }
    }
}
