//! The birthday-cake scene.
//!
//! [`Experience`] is the one [`GraphicsFlow`] of the application. Every
//! component it uses is handed to it or built by it and passed on explicitly:
//! the material bank, the loading manager, the loading status, the intro sequencer,
//! the debug panel and the two model bundles.
//!
//! Loading runs as futures returned from `on_init`; each result comes back as
//! a [`SceneEvent`]. The loading manager's callbacks cannot reach the overlay,
//! so they post [`UiCommand`]s that the next frame applies.

use futures::channel::mpsc;
use winit::event::WindowEvent;

use crate::{
    assembler::{Manifest, assemble},
    audio::BackgroundAudio,
    cancel::CancellationToken,
    config::SceneConfig,
    context::{Context, InitContext},
    data_structures::{
        scene_graph::{GpuBundle, ModelBundle},
        texture::Texture,
    },
    debug::{DebugPanel, DebugTargets},
    error::AssetLoadError,
    flow::{FlowConstructor, GraphicsFlow, Out},
    frame::FrameTime,
    intro::{Cue, IntroFrame, IntroSequencer},
    materials::{GpuMaterials, MaterialBank, TextureKey},
    mixer::AnimationMixer,
    overlay::{LoadingStatus, LogOverlay, Overlay, UiCommand, UiEvent},
    render::Render,
    resources::{
        load_binary, load_image, load_model_gltf,
        loader::{LoadingManager, progress_percent},
    },
};

/// The two model files of the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundleKind {
    Cake,
    Particles,
}

impl BundleKind {
    pub fn manifest(self) -> Manifest {
        match self {
            BundleKind::Cake => Manifest::cake(),
            BundleKind::Particles => Manifest::particles(),
        }
    }

    pub fn path(self, config: &SceneConfig) -> &'static str {
        match self {
            BundleKind::Cake => config.cake_model,
            BundleKind::Particles => config.particle_model,
        }
    }
}

/// Result of one asset request.
#[derive(Debug)]
pub enum SceneEvent {
    Texture {
        key: TextureKey,
        result: Result<image::DynamicImage, AssetLoadError>,
    },
    Model {
        kind: BundleKind,
        result: Result<ModelBundle, AssetLoadError>,
    },
    Audio(Result<(), AssetLoadError>),
}

/// What a failed path has to be requested as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Request {
    Texture(TextureKey),
    Model(BundleKind),
    Audio,
}

impl Request {
    pub fn all() -> Vec<Request> {
        let mut requests = vec![
            Request::Model(BundleKind::Cake),
            Request::Model(BundleKind::Particles),
        ];
        requests.extend(TextureKey::ALL.iter().map(|&key| Request::Texture(key)));
        requests.push(Request::Audio);
        requests
    }

    pub fn path(self, config: &SceneConfig) -> &'static str {
        match self {
            Request::Texture(key) => key.path(),
            Request::Model(kind) => kind.path(config),
            Request::Audio => config.audio,
        }
    }

    /// Maps a path reported by the loading manager back to its request.
    pub fn from_path(path: &str, config: &SceneConfig) -> Option<Request> {
        Request::all()
            .into_iter()
            .find(|request| request.path(config) == path)
    }

    fn future(self, config: &SceneConfig) -> Box<dyn Future<Output = SceneEvent>> {
        let path = self.path(config);
        match self {
            Request::Texture(key) => Box::new(async move {
                SceneEvent::Texture {
                    key,
                    result: load_image(key).await,
                }
            }),
            Request::Model(kind) => Box::new(async move {
                SceneEvent::Model {
                    kind,
                    result: load_model_gltf(path).await,
                }
            }),
            Request::Audio => Box::new(async move {
                SceneEvent::Audio(load_binary(path).await.map(|_| ()))
            }),
        }
    }
}

/// A bundle that passed assembly, with its GPU buffers.
struct PlacedBundle {
    bundle: ModelBundle,
    gpu: GpuBundle,
}

pub struct Experience {
    config: SceneConfig,
    cancel: CancellationToken,
    bank: MaterialBank,
    gpu: GpuMaterials,
    cake: Option<PlacedBundle>,
    particles: Option<PlacedBundle>,
    mixer: AnimationMixer,
    loader: LoadingManager,
    ui_commands: mpsc::UnboundedReceiver<UiCommand>,
    ui_events: mpsc::UnboundedReceiver<UiEvent>,
    #[cfg_attr(target_arch = "wasm32", allow(dead_code))]
    ui_sender: mpsc::UnboundedSender<UiEvent>,
    status: LoadingStatus,
    intro: IntroSequencer,
    audio: BackgroundAudio,
    debug: DebugPanel,
}

impl Experience {
    pub fn new(init: InitContext, config: SceneConfig) -> Self {
        let bank = MaterialBank::new(config.fire);
        let gpu = GpuMaterials::new(&init.device, &init.queue, &init.layouts, &bank);

        let (commands, ui_commands) = mpsc::unbounded();
        let progress = commands.clone();
        let loader = LoadingManager::new(
            move |failed| {
                let _ = commands.unbounded_send(UiCommand::LoadingFinished {
                    failed: failed.to_vec(),
                });
            },
            move |loaded, total| {
                let _ = progress.unbounded_send(UiCommand::Progress(progress_percent(loaded, total)));
            },
        );

        let (ui_sender, ui_events) = mpsc::unbounded();
        let status = LoadingStatus::new(Self::create_overlay(&ui_sender), config.reveal_delay);

        Self {
            intro: IntroSequencer::new(config.camera.start, config.camera.framing, init.cancel.clone()),
            audio: BackgroundAudio::new(config.audio),
            debug: DebugPanel::new(config.debug),
            cancel: init.cancel,
            bank,
            gpu,
            cake: None,
            particles: None,
            mixer: AnimationMixer::default(),
            loader,
            ui_commands,
            ui_events,
            ui_sender,
            status,
            config,
        }
    }

    /// Boxed constructor for [`crate::flow::run`].
    pub fn constructor(config: SceneConfig) -> FlowConstructor<SceneEvent> {
        Box::new(move |init: InitContext| {
            Box::pin(async move {
                Box::new(Experience::new(init, config)) as Box<dyn GraphicsFlow<SceneEvent>>
            })
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn create_overlay(events: &mpsc::UnboundedSender<UiEvent>) -> Box<dyn Overlay> {
        match crate::overlay::DomOverlay::new(events.clone()) {
            Ok(overlay) => Box::new(overlay),
            Err(e) => {
                log::error!("page overlay unavailable, logging instead: {:?}", e);
                Box::new(LogOverlay::new())
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn create_overlay(_events: &mpsc::UnboundedSender<UiEvent>) -> Box<dyn Overlay> {
        Box::new(LogOverlay::new())
    }

    fn request(&mut self, requests: Vec<Request>) -> Out<SceneEvent> {
        if requests.is_empty() {
            return Out::Empty;
        }
        let futures = requests
            .into_iter()
            .map(|request| {
                self.loader.item_start(request.path(&self.config));
                request.future(&self.config)
            })
            .collect();
        Out::FutEvent(futures)
    }

    /// Requests every path that failed so far again.
    fn retry(&mut self) -> Out<SceneEvent> {
        let requests: Vec<Request> = self
            .loader
            .take_failed()
            .iter()
            .filter_map(|path| {
                let request = Request::from_path(path, &self.config);
                if request.is_none() {
                    log::warn!("no request known for failed path {}", path);
                }
                request
            })
            .collect();
        log::info!("retrying {} request(s)", requests.len());
        self.request(requests)
    }

    fn on_model(&mut self, ctx: &Context, kind: BundleKind, mut bundle: ModelBundle) {
        if let Err(e) = assemble(&mut bundle, &kind.manifest()) {
            // the bundle stays out of the scene and the intro stays locked
            log::error!("{}", e);
            self.status.fail(&e.to_string());
            return;
        }
        let gpu = GpuBundle::upload(&ctx.device, &bundle);
        if kind == BundleKind::Particles {
            self.mixer = AnimationMixer::staggered(bundle.clips.len());
            log::info!("{} particle clip(s) scheduled", self.mixer.len());
        }
        let placed = Some(PlacedBundle { bundle, gpu });
        match kind {
            BundleKind::Cake => self.cake = placed,
            BundleKind::Particles => self.particles = placed,
        }
    }

    fn apply_ui_commands(&mut self) {
        while let Ok(Some(command)) = self.ui_commands.try_next() {
            self.status.apply(command);
        }
    }

    fn apply_intro(&mut self, ctx: &mut Context, frame: IntroFrame) {
        if let Some(radius) = frame.reveal_radius {
            self.status.overlay().set_reveal_radius(radius);
        }
        if let Some(position) = frame.camera {
            ctx.camera.camera.position = position;
        }
        for cue in frame.cues {
            match cue {
                Cue::StartAudio => self.audio.play(),
                Cue::UnlockControls => ctx.controls.enable(),
                Cue::RevealFinished | Cue::CameraSettled => (),
            }
        }
    }
}

fn debug_targets<'a>(ctx: &'a mut Context, bank: &'a MaterialBank) -> DebugTargets<'a> {
    DebugTargets {
        bloom: &mut ctx.bloom_settings,
        uniforms: bank.uniforms(),
        camera: &mut ctx.camera.camera,
        controls: &mut ctx.controls,
    }
}

/// Enter begins, R retries, a left click begins while the intro has not run.
#[cfg(not(target_arch = "wasm32"))]
fn native_ui_event(event: &WindowEvent, intro_started: bool) -> Option<UiEvent> {
    use winit::{
        event::{ElementState, KeyEvent, MouseButton},
        keyboard::{Key, NamedKey},
    };

    match event {
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    logical_key,
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } => match logical_key {
            Key::Named(NamedKey::Enter) => Some(UiEvent::Begin),
            Key::Character(c) if c.eq_ignore_ascii_case("r") => Some(UiEvent::Retry),
            _ => None,
        },
        WindowEvent::MouseInput {
            state: ElementState::Pressed,
            button: MouseButton::Left,
            ..
        } if !intro_started => Some(UiEvent::Begin),
        _ => None,
    }
}

impl GraphicsFlow<SceneEvent> for Experience {
    fn on_init(&mut self, ctx: &mut Context) -> Out<SceneEvent> {
        ctx.clear_colour = self.config.clear_colour;
        #[cfg(target_arch = "wasm32")]
        {
            self.debug.mount(&debug_targets(ctx, &self.bank));
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.debug.mount(&ctx.device, ctx.config.format, &ctx.window);
        }
        self.request(Request::all())
    }

    fn on_update(&mut self, ctx: &mut Context, frame: FrameTime) -> Out<SceneEvent> {
        let dt = frame.delta.as_secs_f32();
        let mut out = Out::Empty;

        self.apply_ui_commands();
        while let Ok(Some(event)) = self.ui_events.try_next() {
            match event {
                UiEvent::Begin if self.status.is_ready() && !self.intro.is_started() => {
                    let start = self.intro.start();
                    self.apply_intro(ctx, start);
                }
                UiEvent::Begin => log::debug!("begin ignored"),
                UiEvent::Retry if self.status.fatal().is_some() => log::debug!("retry ignored"),
                UiEvent::Retry => out = self.retry(),
            }
        }

        self.bank.set_time(frame.elapsed.as_secs_f32());
        ctx.controls.update(&mut ctx.camera.camera, dt);
        if let Some(particles) = &mut self.particles {
            self.mixer.update(dt, &mut particles.bundle);
        }

        self.status.advance(frame.delta);
        let intro = self.intro.advance(frame.delta);
        self.apply_intro(ctx, intro);

        #[cfg(not(target_arch = "wasm32"))]
        let window = ctx.window.clone();
        let mut targets = debug_targets(ctx, &self.bank);
        let edits = self.debug.apply_pending(&mut targets);
        #[cfg(target_arch = "wasm32")]
        {
            self.debug.refresh(&targets);
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.debug.refresh(&targets, &window);
            let pixels_per_point = ctx.viewport.pixel_ratio(ctx.max_pixel_ratio) as f32;
            self.debug.prepare(
                &ctx.device,
                &ctx.queue,
                [ctx.config.width, ctx.config.height],
                pixels_per_point,
            );
        }
        if edits > 0 {
            ctx.apply_bloom_settings();
        }

        self.gpu.write_uniforms(&ctx.queue, &self.bank);
        for placed in [&self.cake, &self.particles].into_iter().flatten() {
            placed.gpu.write_transforms(&ctx.queue, &placed.bundle);
        }
        ctx.camera.write(&ctx.queue);
        out
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn on_window_events(&mut self, ctx: &mut Context, event: &WindowEvent) -> Out<SceneEvent> {
        if self.debug.handle_input(&ctx.window, event) {
            return Out::Empty;
        }
        ctx.controls.handle_window_event(event);
        if let Some(ui_event) = native_ui_event(event, self.intro.is_started()) {
            let _ = self.ui_sender.unbounded_send(ui_event);
        }
        Out::Empty
    }

    // the page has its own button in the browser
    #[cfg(target_arch = "wasm32")]
    fn on_window_events(&mut self, ctx: &mut Context, event: &WindowEvent) -> Out<SceneEvent> {
        ctx.controls.handle_window_event(event);
        Out::Empty
    }

    fn on_custom_events(&mut self, ctx: &mut Context, event: SceneEvent) -> Option<SceneEvent> {
        if self.cancel.is_cancelled() {
            log::debug!("dropping {:?}, scene cancelled", event);
            return None;
        }
        match event {
            SceneEvent::Texture { key, result } => {
                let ok = match result {
                    Ok(image) => {
                        let texture =
                            Texture::from_image(&ctx.device, &ctx.queue, &image, Some(key.path()), key.srgb());
                        self.gpu
                            .set_texture(&ctx.device, &ctx.layouts, &self.bank, key, texture);
                        true
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        false
                    }
                };
                self.loader.item_end(key.path(), ok);
            }
            SceneEvent::Model { kind, result } => {
                let path = kind.path(&self.config);
                let ok = match result {
                    Ok(bundle) => {
                        self.on_model(ctx, kind, bundle);
                        true
                    }
                    Err(e) => {
                        log::error!("{}", e);
                        false
                    }
                };
                self.loader.item_end(path, ok);
            }
            SceneEvent::Audio(result) => {
                if let Err(e) = &result {
                    log::error!("{}", e);
                }
                self.loader.item_end(self.config.audio, result.is_ok());
            }
        }
        None
    }

    fn on_render(&self) -> Render<'_> {
        let mut renders = vec![Render::Background(self.gpu.background())];
        renders.extend(
            [&self.cake, &self.particles]
                .into_iter()
                .flatten()
                .map(|placed| placed.gpu.get_render(&self.bank, &self.gpu)),
        );
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(layer) = self.debug.ui_layer() {
                renders.push(Render::Ui(layer));
            }
        }
        Render::Composed(renders)
    }
}

