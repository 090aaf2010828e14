//! Flow control and application event loop.
//!
//! A "flow" is a self-contained piece of the application that handles input,
//! updates its state once per frame and describes what it wants drawn. The
//! [`App`] owns the window and the [`Context`] and drives every flow through
//! winit's [`ApplicationHandler`].
//!
//! # User-facing types
//!
//! - [`GraphicsFlow<E>`] is the trait for scenes that handle events and rendering
//! - [`Out<E>`] is the output type for async event handling
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Collect window events and pass them to every flow
//! 2. Tick the frame clock
//! 3. Update flow state (via `on_update`)
//! 4. Call flows' `on_render()` to collect renderable objects
//! 5. Render the scene pass and the bloom pass, then present

use std::{fmt::Debug, pin::Pin, sync::Arc};

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    cancel::CancellationToken,
    config::SceneConfig,
    context::{Context, InitContext},
    frame::{FrameClock, FrameTime},
    render::{Render, render_frame},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Output of every lifecycle hook.
///
/// `Out::FutEvent` holds futures whose results are delivered back to the flow
/// through `on_custom_events`. Each future is delivered on its own, in the
/// order it resolves, so one slow asset does not hold back the others.
///
/// `Empty` is the default output used when nothing has to be handled.
pub enum Out<E> {
    FutEvent(Vec<Box<dyn Future<Output = E>>>),
    Empty,
}

impl<E> Default for Out<E> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable scene.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once the context exists; configure it and start loading
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_custom_events()` receives the results of futures returned earlier
/// 4. `on_update()` is called every frame, before rendering
/// 5. `on_render()` is called each frame and specifies how to render `self`
pub trait GraphicsFlow<E> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context) -> Out<E>;

    /// Update state every frame. `frame` carries the elapsed time since the
    /// first frame and the delta since the previous one.
    fn on_update(&mut self, ctx: &mut Context, frame: FrameTime) -> Out<E>;

    /// Handle window events (keyboard, mouse, window resizing, etc.). The flow
    /// decides whether the orbit controls see the event.
    fn on_window_events(&mut self, ctx: &mut Context, event: &WindowEvent) -> Out<E>;

    /// Handle the result of a future returned from another hook.
    ///
    /// Returns the event if it was not consumed, allowing it to be passed to
    /// the next flow. Returning `None` means the event was consumed.
    fn on_custom_events(&mut self, ctx: &mut Context, event: E) -> Option<E>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;
}

impl<Event> Debug for dyn GraphicsFlow<Event> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow constructor takes an [`InitContext`] and asynchronously returns a
/// boxed [`GraphicsFlow`].
pub type FlowConstructor<E> =
    Box<dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = Box<dyn GraphicsFlow<E>>>>>>;

/// GPU context plus surface status.
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(
        window: Arc<Window>,
        config: &SceneConfig,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config, cancel).await?;
        Ok(Self {
            ctx,
            is_surface_configured: true,
        })
    }

    fn resize(&mut self) {
        let size = self.ctx.window.inner_size();
        let scale_factor = self.ctx.window.scale_factor();
        self.is_surface_configured = self.ctx.resize(size, scale_factor);
    }
}

pub struct App<Event: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<Event>>,
    state: Option<AppState>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<Event>>>,
    // Taken on the first `resumed`.
    constructors: Option<Vec<FlowConstructor<Event>>>,
    config: SceneConfig,
    clock: FrameClock,
    cancel: CancellationToken,
}

impl<Event: 'static> App<Event> {
    fn new(
        event_loop: &EventLoop<FlowEvent<Event>>,
        constructors: Vec<FlowConstructor<Event>>,
        config: SceneConfig,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            config,
            clock: FrameClock::new(),
            cancel,
        })
    }

    fn init_flows(&mut self) {
        let Some(state) = &mut self.state else {
            return;
        };
        self.graphics_flows.iter_mut().for_each(|flow| {
            let events = flow.on_init(&mut state.ctx);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                self.proxy.clone(),
                events,
            );
        });
        state.ctx.window.request_redraw();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = &mut self.state else {
            return;
        };
        if self.cancel.is_cancelled() {
            log::info!("frame loop cancelled");
            event_loop.exit();
            return;
        }
        // invoke main render loop
        state.ctx.window.request_redraw();
        if !state.is_surface_configured {
            return;
        }

        let frame = self.clock.tick();
        self.graphics_flows.iter_mut().for_each(|flow| {
            let events = flow.on_update(&mut state.ctx, frame);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                self.proxy.clone(),
                events,
            );
        });

        let render = Render::Composed(
            self.graphics_flows
                .iter()
                .map(|flow| flow.on_render())
                .collect(),
        );
        match render_frame(&state.ctx, render) {
            Ok(()) => (),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost, reconfiguring");
                state.resize();
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
    }
}

pub(crate) enum FlowEvent<Event: 'static> {
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    Initialized {
        state: AppState,
        flows: Vec<Box<dyn GraphicsFlow<Event>>>,
    },
    Custom(Event),
    Exit,
}

impl<Event> Debug for FlowEvent<Event> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Custom(_) => f.write_str("Custom(E)"),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

fn create_window(event_loop: &ActiveEventLoop) -> anyhow::Result<Arc<Window>> {
    #[allow(unused_mut)]
    let mut window_attributes = Window::default_attributes().with_title("Happy Birthday");

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;
        use winit::platform::web::WindowAttributesExtWebSys;

        let canvas = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.query_selector(crate::overlay::CANVAS).ok().flatten())
            .ok_or_else(|| anyhow::anyhow!("no canvas matching {}", crate::overlay::CANVAS))?;
        window_attributes = window_attributes.with_canvas(Some(canvas.unchecked_into()));
    }

    Ok(Arc::new(event_loop.create_window(window_attributes)?))
}

impl<Event: 'static> ApplicationHandler<FlowEvent<Event>> for App<Event> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };
        let window = match create_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                log::error!("App initialization failed: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let config = self.config.clone();
        let cancel = self.cancel.clone();
        let init_future = async move {
            let app_state = AppState::new(window, &config, cancel).await?;
            let flow_futures: Vec<_> = constructors
                .into_iter()
                .map(|constructor| constructor((&app_state.ctx).into()))
                .collect();
            let flows: Vec<_> = futures::future::join_all(flow_futures).await;
            anyhow::Ok((app_state, flows))
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => {
                    self.state = Some(app_state);
                    self.graphics_flows = flows;
                    self.init_flows();
                }
                Err(e) => {
                    log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => {
                        log::error!("App initialization failed. Cannot create the main context: {:#}", e);
                        FlowEvent::Exit
                    }
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<Event>) {
        match event {
            FlowEvent::Initialized { state, flows } => {
                // This is the message from our wasm `spawn_local`
                self.state = Some(state);
                self.graphics_flows = flows;
                if let Some(state) = &mut self.state {
                    state.resize();
                }
                self.init_flows();
            }
            FlowEvent::Custom(custom_event) => {
                if let Some(state) = &mut self.state {
                    let result = self
                        .graphics_flows
                        .iter_mut()
                        .fold(Some(custom_event), |event, flow| {
                            flow.on_custom_events(&mut state.ctx, event?)
                        });
                    if result.is_some() {
                        log::warn!("Warning! Custom event was not consumed this cycle");
                    }
                }
            }
            FlowEvent::Exit => {
                self.cancel.cancel();
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        self.graphics_flows.iter_mut().for_each(|f| {
            let events = f.on_window_events(&mut state.ctx, &event);
            handle_flow_output(
                #[cfg(not(target_arch = "wasm32"))]
                &self.async_runtime,
                self.proxy.clone(),
                events,
            );
        });

        match event {
            WindowEvent::CloseRequested => {
                self.cancel.cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => state.resize(),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

fn handle_flow_output<Event: 'static>(
    #[cfg(not(target_arch = "wasm32"))] async_runtime: &tokio::runtime::Runtime,
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<Event>>,
    out: Out<Event>,
) {
    match out {
        // Send the events passed by the user to winit
        Out::FutEvent(futures) => {
            #[cfg(not(target_arch = "wasm32"))]
            {
                for future in futures {
                    let event = async_runtime.block_on(Pin::from(future));
                    if let Err(err) = proxy.send_event(FlowEvent::Custom(event)) {
                        log::error!(
                            "Event loop was closed before all events could be processed: {}",
                            err
                        );
                        return;
                    }
                }
            }

            #[cfg(target_arch = "wasm32")]
            {
                for future in futures {
                    let proxy = proxy.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        let event = Pin::from(future).await;
                        if proxy.send_event(FlowEvent::Custom(event)).is_err() {
                            log::warn!("Event loop was closed before all events could be processed");
                        }
                    });
                }
            }
        }
        Out::Empty => (),
    }
}

/// Cancels `cancel` when the page is hidden for good.
#[cfg(target_arch = "wasm32")]
fn cancel_on_pagehide(cancel: CancellationToken) {
    use wasm_bindgen::JsCast;

    let Some(window) = web_sys::window() else {
        return;
    };
    let listener = Closure::wrap(Box::new(move |_event: web_sys::Event| {
        log::info!("page hidden, stopping");
        cancel.cancel();
    }) as Box<dyn FnMut(web_sys::Event)>);
    if window
        .add_event_listener_with_callback("pagehide", listener.as_ref().unchecked_ref())
        .is_ok()
    {
        // lives as long as the page
        listener.forget();
    }
}

pub fn run<Event: 'static>(
    constructors: Vec<FlowConstructor<Event>>,
    config: SceneConfig,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    let cancel = CancellationToken::new();

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
        cancel_on_pagehide(cancel.clone());
    }

    let event_loop: EventLoop<FlowEvent<Event>> = EventLoop::with_user_event().build()?;
    let mut app: App<Event> = App::new(&event_loop, constructors, config, cancel)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
