//! The page around the canvas: progress counter, begin button and the
//! full-screen mask lifted by the intro.
//!
//! In the browser these are the elements matched by [`COUNTER`], [`CONTENT`],
//! [`BUTTON`] and [`LOADING_SCREEN`]. Natively there is no page, so
//! [`LogOverlay`] reports the same state through the log.

use instant::Duration;

use crate::frame::Delay;

/// Progress counter text.
pub const COUNTER: &str = ".counter";
/// Container revealed once loading is done.
pub const CONTENT: &str = ".content";
/// Click-to-begin control, reused as the retry action.
pub const BUTTON: &str = ".button";
/// Mask covering the canvas until the intro runs.
pub const LOADING_SCREEN: &str = ".loading-screen";
/// Canvas the scene renders into.
pub const CANVAS: &str = ".webgl";

/// State changes for the page, produced by code that cannot reach the overlay
/// directly (loader callbacks).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Progress(u32),
    LoadingFinished { failed: Vec<String> },
}

/// User actions coming back from the page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Begin,
    Retry,
}

/// `clip-path` value for a reveal mask of `radius` percent.
pub fn reveal_clip_path(radius: f32) -> String {
    format!("circle({}% at 50% 62%)", radius.max(0.0))
}

pub trait Overlay {
    fn set_progress(&mut self, percent: u32);
    fn hide_progress(&mut self);
    /// Shows the begin button.
    fn show_content(&mut self);
    fn set_reveal_radius(&mut self, radius: f32);
    fn show_error(&mut self, message: &str);
    /// Offers to fetch `failed` again.
    fn show_retry(&mut self, failed: &[String]);
}

#[derive(Debug, Default)]
pub struct LogOverlay {
    last_progress: Option<u32>,
}

impl LogOverlay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Overlay for LogOverlay {
    fn set_progress(&mut self, percent: u32) {
        if self.last_progress != Some(percent) {
            self.last_progress = Some(percent);
            log::info!("loading {}%", percent);
        }
    }

    fn hide_progress(&mut self) {
        log::debug!("progress counter hidden");
    }

    fn show_content(&mut self) {
        log::info!("ready, press Enter or click to begin");
    }

    fn set_reveal_radius(&mut self, radius: f32) {
        log::trace!("reveal mask {}", reveal_clip_path(radius));
    }

    fn show_error(&mut self, message: &str) {
        log::error!("{}", message);
    }

    fn show_retry(&mut self, failed: &[String]) {
        log::warn!(
            "{} asset(s) failed to load ({}), press R to retry",
            failed.len(),
            failed.join(", ")
        );
    }
}

/// Drives an [`Overlay`] from loading results and decides when the intro may
/// begin.
///
/// A clean finish starts the reveal delay, after which the begin control is
/// shown. An error passed to [`LoadingStatus::fail`] is terminal: the message
/// stays on the overlay, later commands are dropped and the intro never
/// becomes available.
pub struct LoadingStatus {
    overlay: Box<dyn Overlay>,
    reveal_delay: Duration,
    reveal: Option<Delay>,
    fatal: Option<String>,
}

impl LoadingStatus {
    pub fn new(overlay: Box<dyn Overlay>, reveal_delay: Duration) -> Self {
        Self {
            overlay,
            reveal_delay,
            reveal: None,
            fatal: None,
        }
    }

    pub fn overlay(&mut self) -> &mut dyn Overlay {
        self.overlay.as_mut()
    }

    pub fn apply(&mut self, command: UiCommand) {
        if self.fatal.is_some() {
            log::debug!("dropping {:?} after a fatal error", command);
            return;
        }
        match command {
            UiCommand::Progress(percent) => self.overlay.set_progress(percent),
            UiCommand::LoadingFinished { failed } => {
                self.overlay.hide_progress();
                if !failed.is_empty() {
                    self.overlay.show_retry(&failed);
                } else if self.reveal.is_none() {
                    self.reveal = Some(Delay::new(self.reveal_delay));
                } else {
                    self.overlay.show_content();
                }
            }
        }
    }

    /// Shows `message` and keeps it there. Only the first error is kept.
    pub fn fail(&mut self, message: &str) {
        if self.fatal.is_some() {
            log::error!("{}", message);
            return;
        }
        self.fatal = Some(message.to_string());
        self.overlay.show_error(message);
    }

    pub fn advance(&mut self, dt: Duration) {
        if let Some(reveal) = &mut self.reveal {
            if reveal.advance(dt) && self.fatal.is_none() {
                self.overlay.show_content();
            }
        }
    }

    /// `true` once the begin control is showing.
    pub fn is_ready(&self) -> bool {
        self.fatal.is_none() && self.reveal.is_some_and(|delay| delay.has_fired())
    }

    pub fn fatal(&self) -> Option<&str> {
        self.fatal.as_deref()
    }
}

impl std::fmt::Debug for LoadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingStatus")
            .field("reveal", &self.reveal)
            .field("fatal", &self.fatal)
            .finish_non_exhaustive()
    }
}

#[cfg(target_arch = "wasm32")]
pub use dom::DomOverlay;

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::{cell::Cell, rc::Rc};

    use futures::channel::mpsc;
    use wasm_bindgen::{JsCast, JsValue, closure::Closure};
    use web_sys::{Document, HtmlElement};

    use super::{BUTTON, CONTENT, COUNTER, LOADING_SCREEN, Overlay, UiEvent, reveal_clip_path};

    fn query(document: &Document, selector: &str) -> Option<HtmlElement> {
        document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
    }

    pub struct DomOverlay {
        counter: Option<HtmlElement>,
        content: Option<HtmlElement>,
        button: Option<HtmlElement>,
        loading_screen: Option<HtmlElement>,
        label: Option<String>,
        retry: Rc<Cell<bool>>,
        _on_click: Option<Closure<dyn FnMut(web_sys::Event)>>,
    }

    impl DomOverlay {
        /// Binds the page elements. Missing elements are skipped with a
        /// warning; clicks on the button are sent through `events`.
        pub fn new(events: mpsc::UnboundedSender<UiEvent>) -> Result<Self, JsValue> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let lookup = |selector: &str| {
                let element = query(&document, selector);
                if element.is_none() {
                    log::warn!("overlay element {} not found", selector);
                }
                element
            };
            let counter = lookup(COUNTER);
            let content = lookup(CONTENT);
            let button = lookup(BUTTON);
            let loading_screen = lookup(LOADING_SCREEN);

            let retry = Rc::new(Cell::new(false));
            let on_click = match &button {
                Some(button) => {
                    let retry = retry.clone();
                    let listener = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                        let event = if retry.replace(false) {
                            UiEvent::Retry
                        } else {
                            UiEvent::Begin
                        };
                        if events.unbounded_send(event).is_err() {
                            log::warn!("{:?} ignored, scene has stopped", event);
                        }
                    }) as Box<dyn FnMut(web_sys::Event)>);
                    button.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
                    Some(listener)
                }
                None => None,
            };

            let label = button.as_ref().and_then(|b| b.text_content());
            Ok(Self {
                counter,
                content,
                button,
                label,
                loading_screen,
                retry,
                _on_click: on_click,
            })
        }
    }

    impl Overlay for DomOverlay {
        fn set_progress(&mut self, percent: u32) {
            if let Some(counter) = &self.counter {
                counter.set_text_content(Some(&format!("{}%", percent)));
            }
        }

        fn hide_progress(&mut self) {
            if let Some(counter) = &self.counter {
                let _ = counter.class_list().add_1("hide");
            }
        }

        fn show_content(&mut self) {
            if let (false, Some(button)) = (self.retry.get(), &self.button) {
                button.set_text_content(self.label.as_deref());
            }
            if let Some(content) = &self.content {
                let _ = content.class_list().add_1("show");
            }
        }

        fn set_reveal_radius(&mut self, radius: f32) {
            if let Some(screen) = &self.loading_screen {
                let _ = screen.style().set_property("clip-path", &reveal_clip_path(radius));
            }
        }

        fn show_error(&mut self, message: &str) {
            log::error!("{}", message);
            if let Some(counter) = &self.counter {
                let _ = counter.class_list().remove_1("hide");
                counter.set_text_content(Some(message));
            }
        }

        fn show_retry(&mut self, failed: &[String]) {
            log::warn!("offering retry for {}", failed.join(", "));
            self.retry.set(true);
            if let Some(button) = &self.button {
                button.set_text_content(Some("Retry"));
            }
            if let Some(content) = &self.content {
                let _ = content.class_list().add_1("show");
            }
        }
    }
}
