//! Application shell: window lifecycle, event translation and the public
//! command surface consumed by an embedding UI layer.

use std::sync::Arc;

use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes},
};

use crate::gfx::{
    camera::{
        free_camera::{KEY_MOVE_STEP, KEY_MOVE_STEP_FAST, KEY_ROTATE_STEP},
        CameraUniform,
    },
    geometry::ImportError,
    rendering::{color_mode::ColorMode, render_engine::RenderEngine},
    scene::{CameraStateCallback, Scene},
};
use crate::input::{PointerButton, ViewportController};

/// One wheel detent worth of pixel-delta scrolling.
const WHEEL_DETENT: f32 = 120.0;

pub struct CairnApp {
    event_loop: Option<EventLoop<()>>,
    state: ViewportState,
}

struct ViewportState {
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Scene,
    controller: ViewportController,
    cursor_position: (f32, f32),
    shift_held: bool,
}

impl CairnApp {
    /// Create a new viewport application with default settings
    pub async fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            state: ViewportState {
                window: None,
                render_engine: None,
                scene: Scene::new(),
                controller: ViewportController::new(),
                cursor_position: (0.0, 0.0),
                shift_held: false,
            },
        }
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        let _ = env_logger::try_init();

        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Wait);
        event_loop.run_app(&mut self.state)?;
        Ok(())
    }

    pub fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.state.scene
    }

    /// Imports an OBJ file and places it in the scene. On failure the scene
    /// is unchanged and the error is returned to the caller.
    pub fn import_object(&mut self, path: &str) -> Result<usize, ImportError> {
        match self.state.scene.import_object(path) {
            Ok(index) => {
                self.state.request_repaint();
                Ok(index)
            }
            Err(error) => {
                log::warn!("import of {} failed: {}", path, error);
                Err(error)
            }
        }
    }

    pub fn set_camera_position(&mut self, x: f32, y: f32, z: f32) {
        self.state.scene.set_camera_position(x, y, z);
        self.state.request_repaint();
    }

    pub fn set_camera_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.state.scene.set_camera_rotation(x, y, z);
        self.state.request_repaint();
    }

    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.state.scene.set_color_mode(mode);
        self.state.request_repaint();
    }

    /// Observer mirroring the camera pose into an external UI.
    pub fn set_camera_observer(&mut self, callback: CameraStateCallback) {
        self.state.scene.set_camera_observer(callback);
    }

    /// Clears the scene, restores the default camera pose and color mode,
    /// and drops all interaction state.
    pub fn reset(&mut self) {
        self.state.scene.reset();
        self.state.controller.reset();
        self.state.request_repaint();
    }
}

impl ViewportState {
    fn request_repaint(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn viewport(&self) -> (u32, u32) {
        self.render_engine
            .as_ref()
            .map(|engine| engine.size())
            .unwrap_or((0, 0))
    }

    /// Discrete camera navigation, independent of the pointer modes.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let move_step = if self.shift_held {
            KEY_MOVE_STEP_FAST
        } else {
            KEY_MOVE_STEP
        };
        let camera = &mut self.scene.camera;

        match code {
            // Camera translation
            KeyCode::KeyW => camera.translate_step(Vector3::new(0.0, 0.0, -move_step)),
            KeyCode::KeyS => camera.translate_step(Vector3::new(0.0, 0.0, move_step)),
            KeyCode::KeyA => camera.translate_step(Vector3::new(-move_step, 0.0, 0.0)),
            KeyCode::KeyD => camera.translate_step(Vector3::new(move_step, 0.0, 0.0)),
            KeyCode::KeyR => camera.translate_step(Vector3::new(0.0, move_step, 0.0)),
            KeyCode::KeyF => camera.translate_step(Vector3::new(0.0, -move_step, 0.0)),

            // Camera rotation
            KeyCode::KeyJ => camera.rotate_step(Vector3::new(0.0, -KEY_ROTATE_STEP, 0.0)),
            KeyCode::KeyL => camera.rotate_step(Vector3::new(0.0, KEY_ROTATE_STEP, 0.0)),
            KeyCode::KeyI => camera.rotate_step(Vector3::new(-KEY_ROTATE_STEP, 0.0, 0.0)),
            KeyCode::KeyK => camera.rotate_step(Vector3::new(KEY_ROTATE_STEP, 0.0, 0.0)),
            KeyCode::KeyU => camera.rotate_step(Vector3::new(0.0, 0.0, -KEY_ROTATE_STEP)),
            KeyCode::KeyO => camera.rotate_step(Vector3::new(0.0, 0.0, KEY_ROTATE_STEP)),

            // Projection toggle
            KeyCode::KeyP => camera.toggle_projection(),

            _ => return false,
        }

        self.scene.emit_camera_state();
        true
    }
}

fn map_pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

impl ApplicationHandler for ViewportState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("cairn")
                .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
        ) {
            let window_handle = Arc::new(window);
            self.window = Some(window_handle.clone());

            let (width, height) = window_handle.inner_size().into();

            let window_clone = window_handle.clone();
            let renderer = pollster::block_on(async move {
                RenderEngine::new(window_clone, width, height).await
            });

            self.scene
                .init_gpu_resources(renderer.device(), renderer.draw_bind_group_layout());
            self.render_engine = Some(renderer);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let Some(render_engine) = self.render_engine.as_mut() else {
                    return;
                };
                let (width, height) = render_engine.size();
                render_engine.update(CameraUniform::from_camera(&self.scene.camera, width, height));

                // Late imports get their buffers here; the call is idempotent.
                self.scene
                    .init_gpu_resources(render_engine.device(), render_engine.draw_bind_group_layout());
                self.scene.update_draw_uniforms(render_engine.queue());

                render_engine.render_frame(&self.scene);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.shift_held = modifiers.state().shift_key();
                self.controller.set_shift_held(self.shift_held);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if matches!(code, KeyCode::Escape) {
                    event_loop.exit();
                    return;
                }
                if self.handle_key(code) {
                    window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = (position.x as f32, position.y as f32);
                let viewport = self.viewport();
                if self
                    .controller
                    .pointer_moved(self.cursor_position, &mut self.scene, viewport)
                {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = map_pointer_button(button) else {
                    return;
                };
                let viewport = self.viewport();
                let repaint = match state {
                    ElementState::Pressed => self.controller.pointer_pressed(
                        button,
                        self.cursor_position,
                        &mut self.scene,
                        viewport,
                    ),
                    ElementState::Released => self.controller.pointer_released(button),
                };
                if repaint {
                    window.request_redraw();
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / WHEEL_DETENT,
                };
                if self.controller.wheel(steps, &mut self.scene) {
                    window.request_redraw();
                }
            }
            _ => (),
        }
    }
}
