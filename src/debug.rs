//! Debug panel: live-tunable bloom, fire uniform and camera parameters.
//!
//! The panel is a plain description of folders and controls. Edits arrive as
//! [`Edit`] messages through a channel and are applied by the frame loop, so
//! they take effect on the next frame. In the browser DOM sliders send them;
//! natively an egui window drawn over the scene does. Values are clamped to
//! the control's range and snapped to its step; nothing else is validated.

use futures::channel::mpsc;
#[cfg(not(target_arch = "wasm32"))]
use winit::{event::WindowEvent, window::Window};

use crate::{
    camera::PerspectiveCamera, controls::OrbitControls, materials::SharedUniforms,
    pipelines::bloom::BloomSettings,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    BloomEnabled,
    BloomStrength,
    BloomRadius,
    BloomThreshold,
    EmissiveMultiplier,
    OpacityMultiplier,
    AnimationMultiplier,
    FrequencyX,
    FrequencyY,
    CameraX,
    CameraY,
    CameraZ,
    TargetX,
    TargetY,
    TargetZ,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlKind {
    Toggle,
    Slider { min: f32, max: f32, step: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f32),
}

impl Value {
    pub fn as_f32(self) -> f32 {
        match self {
            Value::Bool(b) => b as u8 as f32,
            Value::Number(n) => n,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Control {
    pub label: &'static str,
    pub binding: Binding,
    pub kind: ControlKind,
    /// Re-read from the scene every frame.
    pub listen: bool,
}

impl Control {
    const fn slider(label: &'static str, binding: Binding, max: f32) -> Self {
        Self {
            label,
            binding,
            kind: ControlKind::Slider {
                min: 0.0,
                max,
                step: 0.001,
            },
            listen: false,
        }
    }

    const fn listening(mut self) -> Self {
        self.listen = true;
        self
    }

    /// Brings `value` into the control's range.
    pub fn constrain(&self, value: Value) -> Value {
        match (self.kind, value) {
            (ControlKind::Toggle, Value::Bool(b)) => Value::Bool(b),
            (ControlKind::Toggle, Value::Number(n)) => Value::Bool(n != 0.0),
            (ControlKind::Slider { min, max, step }, value) => {
                Value::Number(snap(value.as_f32(), min, max, step))
            }
        }
    }
}

/// Clamps `value` to `[min, max]` and snaps it to the nearest step from `min`.
pub fn snap(value: f32, min: f32, max: f32, step: f32) -> f32 {
    if value.is_nan() {
        return min;
    }
    let clamped = value.clamp(min, max);
    if step <= 0.0 {
        return clamped;
    }
    let steps = ((clamped - min) / step).round();
    (min + steps * step).clamp(min, max)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Folder {
    pub title: &'static str,
    pub controls: Vec<Control>,
}

fn folders() -> Vec<Folder> {
    use Binding::*;
    vec![
        Folder {
            title: "Bloom",
            controls: vec![
                Control {
                    label: "enabled",
                    binding: BloomEnabled,
                    kind: ControlKind::Toggle,
                    listen: false,
                },
                Control::slider("strength", BloomStrength, 5.0),
                Control::slider("radius", BloomRadius, 5.0),
                Control::slider("threshold", BloomThreshold, 5.0),
            ],
        },
        Folder {
            title: "Uniform",
            controls: vec![
                Control::slider("emissive intensity", EmissiveMultiplier, 5.0),
                Control::slider("opacity intensity", OpacityMultiplier, 5.0),
                Control::slider("animation speed", AnimationMultiplier, 20.0),
                Control::slider("x frequency", FrequencyX, 20.0),
                Control::slider("y frequency", FrequencyY, 20.0),
            ],
        },
        Folder {
            title: "Camera & Controls",
            controls: vec![
                Control::slider("camera x", CameraX, 20.0).listening(),
                Control::slider("camera y", CameraY, 20.0).listening(),
                Control::slider("camera z", CameraZ, 20.0).listening(),
                Control::slider("target x", TargetX, 20.0).listening(),
                Control::slider("target y", TargetY, 20.0).listening(),
                Control::slider("target z", TargetZ, 20.0).listening(),
            ],
        },
    ]
}

/// Everything the panel can reach, borrowed for one frame.
pub struct DebugTargets<'a> {
    pub bloom: &'a mut BloomSettings,
    pub uniforms: &'a SharedUniforms,
    pub camera: &'a mut PerspectiveCamera,
    pub controls: &'a mut OrbitControls,
}

impl DebugTargets<'_> {
    pub fn read(&self, binding: Binding) -> Value {
        let uniforms = self.uniforms.get();
        let number = match binding {
            Binding::BloomEnabled => return Value::Bool(self.bloom.enabled),
            Binding::BloomStrength => self.bloom.strength,
            Binding::BloomRadius => self.bloom.radius,
            Binding::BloomThreshold => self.bloom.threshold,
            Binding::EmissiveMultiplier => uniforms.emissive_multiplier,
            Binding::OpacityMultiplier => uniforms.opacity_multiplier,
            Binding::AnimationMultiplier => uniforms.animation_multiplier,
            Binding::FrequencyX => uniforms.frequency[0],
            Binding::FrequencyY => uniforms.frequency[1],
            Binding::CameraX => self.camera.position.x,
            Binding::CameraY => self.camera.position.y,
            Binding::CameraZ => self.camera.position.z,
            Binding::TargetX => self.controls.target.x,
            Binding::TargetY => self.controls.target.y,
            Binding::TargetZ => self.controls.target.z,
        };
        Value::Number(number)
    }

    fn write(&mut self, binding: Binding, value: Value) {
        let n = value.as_f32();
        match binding {
            Binding::BloomEnabled => self.bloom.enabled = n != 0.0,
            Binding::BloomStrength => self.bloom.strength = n,
            Binding::BloomRadius => self.bloom.radius = n,
            Binding::BloomThreshold => self.bloom.threshold = n,
            Binding::EmissiveMultiplier => self.uniforms.update(|u| u.emissive_multiplier = n),
            Binding::OpacityMultiplier => self.uniforms.update(|u| u.opacity_multiplier = n),
            Binding::AnimationMultiplier => self.uniforms.update(|u| u.animation_multiplier = n),
            Binding::FrequencyX => self.uniforms.update(|u| u.frequency[0] = n),
            Binding::FrequencyY => self.uniforms.update(|u| u.frequency[1] = n),
            Binding::CameraX => self.camera.position.x = n,
            Binding::CameraY => self.camera.position.y = n,
            Binding::CameraZ => self.camera.position.z = n,
            Binding::TargetX => self.controls.target.x = n,
            Binding::TargetY => self.controls.target.y = n,
            Binding::TargetZ => self.controls.target.z = n,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edit {
    pub binding: Binding,
    pub value: Value,
}

/// Edits for the entries of `after` that differ from the same binding in
/// `before`.
pub fn changes(before: &[(Binding, Value)], after: &[(Binding, Value)]) -> Vec<Edit> {
    after
        .iter()
        .filter(|(binding, value)| {
            !before
                .iter()
                .any(|(old_binding, old)| old_binding == binding && old == value)
        })
        .map(|&(binding, value)| Edit { binding, value })
        .collect()
}

pub struct DebugPanel {
    visible: bool,
    folders: Vec<Folder>,
    sender: mpsc::UnboundedSender<Edit>,
    edits: mpsc::UnboundedReceiver<Edit>,
    #[cfg(target_arch = "wasm32")]
    dom: Option<dom::DomPanel>,
    #[cfg(not(target_arch = "wasm32"))]
    ui: Option<native::UiLayer>,
}

impl std::fmt::Debug for DebugPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebugPanel")
            .field("visible", &self.visible)
            .field("folders", &self.folders.len())
            .finish()
    }
}

impl DebugPanel {
    /// A hidden panel still accepts edits; it just never builds its controls.
    pub fn new(visible: bool) -> Self {
        let (sender, edits) = mpsc::unbounded();
        Self {
            visible,
            folders: folders(),
            sender,
            edits,
            #[cfg(target_arch = "wasm32")]
            dom: None,
            #[cfg(not(target_arch = "wasm32"))]
            ui: None,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn control(&self, binding: Binding) -> Option<&Control> {
        self.folders
            .iter()
            .flat_map(|folder| folder.controls.iter())
            .find(|control| control.binding == binding)
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<Edit> {
        self.sender.clone()
    }

    /// Applies one edit immediately, returning the value actually stored.
    pub fn apply(&self, edit: Edit, targets: &mut DebugTargets<'_>) -> Option<Value> {
        let control = self.control(edit.binding)?;
        let value = control.constrain(edit.value);
        log::debug!("debug edit {:?} = {:?}", edit.binding, value);
        targets.write(edit.binding, value);
        Some(value)
    }

    /// Drains queued edits. Returns how many were applied.
    pub fn apply_pending(&mut self, targets: &mut DebugTargets<'_>) -> usize {
        let mut applied = 0;
        while let Ok(Some(edit)) = self.edits.try_next() {
            if self.apply(edit, targets).is_some() {
                applied += 1;
            }
        }
        applied
    }

    /// Current value of every control, in folder order.
    pub fn snapshot(&self, targets: &DebugTargets<'_>) -> Vec<(Binding, Value)> {
        self.folders
            .iter()
            .flat_map(|folder| folder.controls.iter())
            .map(|control| (control.binding, targets.read(control.binding)))
            .collect()
    }

    /// Current values of the controls that follow the scene.
    pub fn listened(&self, targets: &DebugTargets<'_>) -> Vec<(Binding, Value)> {
        self.folders
            .iter()
            .flat_map(|folder| folder.controls.iter())
            .filter(|control| control.listen)
            .map(|control| (control.binding, targets.read(control.binding)))
            .collect()
    }

    /// Builds the DOM controls once, when the panel is visible.
    #[cfg(target_arch = "wasm32")]
    pub fn mount(&mut self, targets: &DebugTargets<'_>) {
        if !self.visible || self.dom.is_some() {
            return;
        }
        match dom::DomPanel::build(&self.folders, targets, self.sender.clone()) {
            Ok(panel) => self.dom = Some(panel),
            Err(e) => log::error!("could not build debug panel: {:?}", e),
        }
    }

    /// Creates the egui layer once, when the panel is visible.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn mount(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) {
        if !self.visible || self.ui.is_some() {
            return;
        }
        self.ui = Some(native::UiLayer::new(device, format, window));
        log::info!(
            "debug panel enabled with {} controls",
            self.folders.iter().map(|f| f.controls.len()).sum::<usize>()
        );
    }

    /// Forwards a window event to the panel. `true` when the panel used it
    /// and the scene should not see it.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
        match &mut self.ui {
            Some(ui) => ui.handle_input(window, event),
            None => false,
        }
    }

    /// Pushes live values back into the listening controls.
    #[cfg(target_arch = "wasm32")]
    pub fn refresh(&self, targets: &DebugTargets<'_>) {
        if let (true, Some(dom)) = (self.visible, &self.dom) {
            dom.refresh(&self.listened(targets));
        }
    }

    /// Builds this frame's egui window from the live values and queues an
    /// edit for every widget the user moved.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn refresh(&mut self, targets: &DebugTargets<'_>, window: &Window) {
        if !self.visible || self.ui.is_none() {
            return;
        }
        let before = self.snapshot(targets);
        let mut after = before.clone();
        if let Some(ui) = &mut self.ui {
            ui.begin_frame(window);
            controls_ui(ui.context(), &self.folders, &mut after);
            ui.end_frame(window);
        }
        for edit in changes(&before, &after) {
            if self.sender.unbounded_send(edit).is_err() {
                log::warn!("debug panel edit dropped, frame loop has stopped");
            }
        }
    }

    /// Uploads the egui frame built by [`DebugPanel::refresh`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size_in_pixels: [u32; 2],
        pixels_per_point: f32,
    ) {
        if let Some(ui) = &mut self.ui {
            ui.prepare(device, queue, size_in_pixels, pixels_per_point);
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn ui_layer(&self) -> Option<&UiLayer> {
        self.ui.as_ref()
    }
}

/// Lays out one collapsing section per folder. Widgets edit `values` in place.
#[cfg(not(target_arch = "wasm32"))]
pub fn controls_ui(ctx: &egui::Context, folders: &[Folder], values: &mut [(Binding, Value)]) {
    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_width(280.0)
        .show(ctx, |ui| {
            for folder in folders {
                ui.collapsing(folder.title, |ui| {
                    for control in &folder.controls {
                        let Some((_, value)) = values
                            .iter_mut()
                            .find(|(binding, _)| *binding == control.binding)
                        else {
                            continue;
                        };
                        match (control.kind, value) {
                            (ControlKind::Toggle, Value::Bool(on)) => {
                                ui.checkbox(on, control.label);
                            }
                            (ControlKind::Slider { min, max, step }, Value::Number(number)) => {
                                ui.add(
                                    egui::Slider::new(number, min..=max)
                                        .step_by(step as f64)
                                        .text(control.label),
                                );
                            }
                            (kind, value) => {
                                log::warn!("{:?} cannot show {:?}", kind, value)
                            }
                        }
                    }
                });
            }
        });
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::UiLayer;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use winit::{
        event::{ElementState, WindowEvent},
        window::Window,
    };

    /// egui context, winit input bridge and wgpu renderer for the panel.
    pub struct UiLayer {
        egui_ctx: egui::Context,
        state: egui_winit::State,
        renderer: egui_wgpu::Renderer,
        clipped_primitives: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: egui_wgpu::ScreenDescriptor,
    }

    impl UiLayer {
        pub(super) fn new(device: &wgpu::Device, format: wgpu::TextureFormat, window: &Window) -> Self {
            let size = window.inner_size();
            let egui_ctx = egui::Context::default();
            let id = egui_ctx.viewport_id();
            let state = egui_winit::State::new(egui_ctx.clone(), id, window, None, None, None);
            let renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());
            Self {
                egui_ctx,
                state,
                renderer,
                clipped_primitives: Vec::new(),
                textures_delta: egui::TexturesDelta::default(),
                screen_descriptor: egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [size.width, size.height],
                    pixels_per_point: window.scale_factor() as f32,
                },
            }
        }

        /// Button releases are never reported as used so a drag on the
        /// scene always ends.
        pub(super) fn handle_input(&mut self, window: &Window, event: &WindowEvent) -> bool {
            let response = self.state.on_window_event(window, event);
            if let WindowEvent::MouseInput {
                state: ElementState::Released,
                ..
            } = event
            {
                return false;
            }
            response.consumed
        }

        pub(super) fn context(&self) -> &egui::Context {
            &self.egui_ctx
        }

        pub(super) fn begin_frame(&mut self, window: &Window) {
            let raw_input = self.state.take_egui_input(window);
            self.egui_ctx.begin_pass(raw_input);
        }

        pub(super) fn end_frame(&mut self, window: &Window) {
            let egui::FullOutput {
                shapes,
                textures_delta,
                platform_output,
                ..
            } = self.egui_ctx.end_pass();
            self.state.handle_platform_output(window, platform_output);
            self.textures_delta = textures_delta;
            self.clipped_primitives = self
                .egui_ctx
                .tessellate(shapes, self.egui_ctx.pixels_per_point());
        }

        pub(super) fn prepare(
            &mut self,
            device: &wgpu::Device,
            queue: &wgpu::Queue,
            size_in_pixels: [u32; 2],
            pixels_per_point: f32,
        ) {
            self.screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels,
                pixels_per_point,
            };
            for (id, delta) in &self.textures_delta.set {
                self.renderer.update_texture(device, queue, *id, delta);
            }

            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Debug UI Upload"),
            });
            let user_buffers = self.renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &self.clipped_primitives,
                &self.screen_descriptor,
            );
            queue.submit(std::iter::once(encoder.finish()).chain(user_buffers));

            for id in &self.textures_delta.free {
                self.renderer.free_texture(id);
            }
            self.textures_delta.set.clear();
            self.textures_delta.free.clear();
        }

        /// Draws the panel on top of whatever `view` already holds.
        pub(crate) fn draw(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Debug UI Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut render_pass, &self.clipped_primitives, &self.screen_descriptor);
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod dom {
    use std::collections::HashMap;

    use futures::channel::mpsc;
    use wasm_bindgen::{JsCast, JsValue, closure::Closure};
    use web_sys::{Document, HtmlElement, HtmlInputElement};

    use super::{Binding, ControlKind, DebugTargets, Edit, Folder, Value};

    pub(super) struct DomPanel {
        root: HtmlElement,
        inputs: HashMap<Binding, HtmlInputElement>,
        _listeners: Vec<Closure<dyn FnMut(web_sys::Event)>>,
    }

    fn element(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
        document.create_element(tag)?.dyn_into::<HtmlElement>().map_err(JsValue::from)
    }

    impl DomPanel {
        pub(super) fn build(
            folders: &[Folder],
            targets: &DebugTargets<'_>,
            sender: mpsc::UnboundedSender<Edit>,
        ) -> Result<Self, JsValue> {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or_else(|| JsValue::from_str("no document"))?;
            let root = element(&document, "div")?;
            root.set_class_name("debug-panel");
            let style = root.style();
            style.set_property("position", "fixed")?;
            style.set_property("top", "0")?;
            style.set_property("right", "0")?;
            style.set_property("z-index", "10")?;

            let mut inputs = HashMap::new();
            let mut listeners = Vec::new();
            for folder in folders {
                let details = element(&document, "details")?;
                let summary = element(&document, "summary")?;
                summary.set_text_content(Some(folder.title));
                details.append_child(&summary)?;

                for control in &folder.controls {
                    let row = element(&document, "label")?;
                    row.set_text_content(Some(control.label));
                    let input = document
                        .create_element("input")?
                        .dyn_into::<HtmlInputElement>()
                        .map_err(JsValue::from)?;
                    match (control.kind, targets.read(control.binding)) {
                        (ControlKind::Toggle, value) => {
                            input.set_type("checkbox");
                            input.set_checked(value.as_f32() != 0.0);
                        }
                        (ControlKind::Slider { min, max, step }, value) => {
                            input.set_type("range");
                            input.set_min(&min.to_string());
                            input.set_max(&max.to_string());
                            input.set_step(&step.to_string());
                            input.set_value(&value.as_f32().to_string());
                        }
                    }

                    let binding = control.binding;
                    let kind = control.kind;
                    let source = input.clone();
                    let sender = sender.clone();
                    let listener = Closure::wrap(Box::new(move |_event: web_sys::Event| {
                        let value = match kind {
                            ControlKind::Toggle => Value::Bool(source.checked()),
                            ControlKind::Slider { .. } => Value::Number(source.value_as_number() as f32),
                        };
                        if sender.unbounded_send(Edit { binding, value }).is_err() {
                            log::warn!("debug panel edit dropped, frame loop has stopped");
                        }
                    }) as Box<dyn FnMut(web_sys::Event)>);
                    input.add_event_listener_with_callback("input", listener.as_ref().unchecked_ref())?;
                    listeners.push(listener);

                    row.append_child(&input)?;
                    details.append_child(&row)?;
                    inputs.insert(control.binding, input);
                }
                root.append_child(&details)?;
            }

            document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&root)?;

            Ok(Self {
                root,
                inputs,
                _listeners: listeners,
            })
        }

        pub(super) fn refresh(&self, values: &[(Binding, Value)]) {
            for (binding, value) in values {
                if let Some(input) = self.inputs.get(binding) {
                    input.set_value(&value.as_f32().to_string());
                }
            }
        }
    }

    impl Drop for DomPanel {
        fn drop(&mut self) {
            self.root.remove();
        }
    }
}
