//! # Interaction State Machine
//!
//! Resolves raw pointer events into one of a fixed set of exclusive modes
//! and dispatches them to the camera and the scene registry. The mode is a
//! single tagged enum, so two modes being active at once is unrepresentable;
//! transitions only happen on explicit button press/release events.
//!
//! Keyboard navigation lives in the app layer — discrete camera steps do not
//! participate in the pointer modes.

use std::time::{Duration, Instant};

use cgmath::Vector3;

use crate::gfx::{picking, scene::Scene};

/// Presses closer together than this in time and space count as double-clicks.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
const DOUBLE_CLICK_SLOP_PX: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// The exclusive interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Primary drag: free-look camera orbit
    Orbiting,
    /// Secondary drag: camera pan
    Panning,
    /// Secondary drag on a selected object: slide it along the ground.
    /// The offset keeps the object's position relative to the cursor.
    DraggingObject { grab_offset: Vector3<f32> },
    /// Middle drag: orbit the camera around the focus point
    ScrollOrbiting,
}

/// Consumes pointer events and drives the camera and scene.
///
/// Every method returns whether a repaint should be requested.
pub struct ViewportController {
    mode: InteractionMode,
    last_pointer: (f32, f32),
    shift_held: bool,
    last_primary_press: Option<(Instant, (f32, f32))>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self {
            mode: InteractionMode::Idle,
            last_pointer: (0.0, 0.0),
            shift_held: false,
            last_primary_press: None,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Tracks the shift modifier (vertical pan while panning).
    pub fn set_shift_held(&mut self, held: bool) {
        self.shift_held = held;
    }

    /// Clears all interaction state; part of the subsystem-wide reset.
    pub fn reset(&mut self) {
        self.mode = InteractionMode::Idle;
        self.last_primary_press = None;
    }

    pub fn pointer_pressed(
        &mut self,
        button: PointerButton,
        position: (f32, f32),
        scene: &mut Scene,
        viewport: (u32, u32),
    ) -> bool {
        self.last_pointer = position;

        match button {
            PointerButton::Primary => {
                if self.is_double_click(position) {
                    self.last_primary_press = None;
                    return self.double_click(position, scene, viewport);
                }
                self.last_primary_press = Some((Instant::now(), position));

                // A press that misses every pickable sphere deselects and
                // returns the focus to the origin before orbiting starts.
                if scene.selected().is_some() {
                    let hit = screen_pick(position, viewport, scene);
                    if hit.is_none() {
                        scene.select(None);
                        log::debug!("selection cleared by click miss");
                    }
                }

                self.mode = InteractionMode::Orbiting;
                true
            }
            PointerButton::Secondary => {
                // Dragging needs a selected object and a ground hit under
                // the cursor; otherwise the press pans the camera.
                let grab = scene.selected_object().and_then(|object| {
                    let ray = picking::screen_to_ray(position, viewport, &scene.camera)?;
                    let hit = picking::intersect_ground_plane(&ray)?;
                    Some(object.placement.translation - hit)
                });
                self.mode = match grab {
                    Some(grab_offset) => InteractionMode::DraggingObject { grab_offset },
                    None => InteractionMode::Panning,
                };
                true
            }
            PointerButton::Middle => {
                self.mode = InteractionMode::ScrollOrbiting;
                true
            }
        }
    }

    pub fn pointer_released(&mut self, button: PointerButton) -> bool {
        let finished = matches!(
            (button, self.mode),
            (PointerButton::Primary, InteractionMode::Orbiting)
                | (PointerButton::Secondary, InteractionMode::Panning)
                | (PointerButton::Secondary, InteractionMode::DraggingObject { .. })
                | (PointerButton::Middle, InteractionMode::ScrollOrbiting)
        );
        if finished {
            self.mode = InteractionMode::Idle;
        }
        false
    }

    pub fn pointer_moved(
        &mut self,
        position: (f32, f32),
        scene: &mut Scene,
        viewport: (u32, u32),
    ) -> bool {
        let delta_x = position.0 - self.last_pointer.0;
        let delta_y = position.1 - self.last_pointer.1;
        self.last_pointer = position;

        match self.mode {
            InteractionMode::Idle => false,
            InteractionMode::Orbiting => {
                scene.camera.orbit(delta_x, delta_y);
                scene.emit_camera_state();
                true
            }
            InteractionMode::Panning => {
                scene.camera.pan(delta_x, delta_y, self.shift_held);
                scene.emit_camera_state();
                true
            }
            InteractionMode::ScrollOrbiting => {
                let focus = scene.focus_point();
                scene.camera.orbit_around_focus(delta_x, focus);
                scene.emit_camera_state();
                true
            }
            InteractionMode::DraggingObject { grab_offset } => {
                let hit = picking::screen_to_ray(position, viewport, &scene.camera)
                    .and_then(|ray| picking::intersect_ground_plane(&ray));
                match hit {
                    Some(point) => {
                        if let Some(object) = scene.selected_object_mut() {
                            object.placement.translation = point + grab_offset;
                        }
                        true
                    }
                    // Cursor left the ground (or the ray went degenerate):
                    // no interaction result this frame
                    None => false,
                }
            }
        }
    }

    /// Wheel dispatch is mutually exclusive: a selected object rescales,
    /// otherwise the camera dollies.
    pub fn wheel(&mut self, steps: f32, scene: &mut Scene) -> bool {
        if let Some(object) = scene.selected_object_mut() {
            object.placement.rescale(steps);
        } else {
            scene.camera.dolly(steps);
            scene.emit_camera_state();
        }
        true
    }

    fn is_double_click(&self, position: (f32, f32)) -> bool {
        self.last_primary_press.map_or(false, |(at, previous)| {
            at.elapsed() <= DOUBLE_CLICK_WINDOW
                && (position.0 - previous.0).abs() <= DOUBLE_CLICK_SLOP_PX
                && (position.1 - previous.1).abs() <= DOUBLE_CLICK_SLOP_PX
        })
    }

    /// Double-click always attempts a pick. A hit selects, moves the focus
    /// to the object and force-clears any drag/orbit in progress. A miss
    /// leaves the scene untouched — unlike a single-click miss, which
    /// deselects. The asymmetry is deliberate.
    fn double_click(
        &mut self,
        position: (f32, f32),
        scene: &mut Scene,
        viewport: (u32, u32),
    ) -> bool {
        match screen_pick(position, viewport, scene) {
            Some(index) => {
                scene.select(Some(index));
                self.mode = InteractionMode::Idle;
                log::debug!("object {} selected", index);
                true
            }
            None => false,
        }
    }
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new()
    }
}

fn screen_pick(position: (f32, f32), viewport: (u32, u32), scene: &Scene) -> Option<usize> {
    let ray = picking::screen_to_ray(position, viewport, &scene.camera)?;
    picking::pick_object(&ray, &scene.placements())
}
