//! Orbit-style camera control.
//!
//! Dragging with the left button rotates the camera around the target on a
//! sphere, the wheel moves it closer or further. The controls start locked and
//! are unlocked by the intro.
//!
//! Each update starts from the camera's current offset to the target, so other
//! writers of the camera position (the intro fly-in, the debug panel) are never
//! overwritten.

use cgmath::{InnerSpace, Point3, Vector2, Vector3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use crate::camera::PerspectiveCamera;

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub enabled: bool,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub target: Point3<f32>,

    rotate_delta: Vector2<f32>,
    zoom_delta: f32,
    dragging: bool,
    cursor: Option<Vector2<f32>>,
    screen_height: f32,
}

impl OrbitControls {
    /// Locked controls around `target`: no drag, no zoom, no pan.
    pub fn new(target: Point3<f32>) -> Self {
        Self {
            enabled: false,
            enable_zoom: false,
            enable_pan: false,
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            target,
            rotate_delta: Vector2::new(0.0, 0.0),
            zoom_delta: 0.0,
            dragging: false,
            cursor: None,
            screen_height: 1.0,
        }
    }

    /// Unlocks rotation and zoom. Pan stays off.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.enable_zoom = true;
        log::info!("orbit controls enabled");
    }

    pub fn set_screen_height(&mut self, height: u32) {
        self.screen_height = height.max(1) as f32;
    }

    /// Accumulates pointer input. Input is dropped while the controls are
    /// locked.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = self.enabled && *state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                let cursor = Vector2::new(position.x as f32, position.y as f32);
                if let (true, true, Some(last)) = (self.enabled, self.dragging, self.cursor) {
                    let per_pixel = 2.0 * std::f32::consts::PI / self.screen_height;
                    let delta = cursor - last;
                    self.rotate_delta -= delta * per_pixel * self.rotate_speed;
                }
                self.cursor = Some(cursor);
            }
            WindowEvent::MouseWheel { delta, .. } if self.enabled && self.enable_zoom => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.zoom_delta += lines;
            }
            _ => (),
        }
    }

    /// Applies pending input with damping. `dt` in seconds.
    pub fn update(&mut self, camera: &mut PerspectiveCamera, dt: f32) {
        camera.target = self.target;

        let (applied, zoom) = if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * 60.0);
            let applied = self.rotate_delta * (1.0 - retention);
            self.rotate_delta *= retention;
            (applied, std::mem::take(&mut self.zoom_delta))
        } else {
            (
                std::mem::replace(&mut self.rotate_delta, Vector2::new(0.0, 0.0)),
                std::mem::take(&mut self.zoom_delta),
            )
        };
        if applied.magnitude2() < f32::EPSILON * f32::EPSILON && zoom == 0.0 {
            return;
        }

        let offset = camera.position - self.target;
        let mut radius = offset.magnitude();
        if radius <= f32::EPSILON {
            return;
        }
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += applied.x;
        phi += applied.y;
        const EPS: f32 = 0.0001;
        phi = phi.clamp(EPS, std::f32::consts::PI - EPS);

        if zoom != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(zoom.abs());
            radius = if zoom > 0.0 { radius * scale } else { radius / scale };
            radius = radius.clamp(self.min_distance, self.max_distance);
        }

        let offset = Vector3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.position = self.target + offset;
    }
}
