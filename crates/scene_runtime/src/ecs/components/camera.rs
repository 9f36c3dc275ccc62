//! Scene camera component
//!
//! Projection parameters are plain fields behind setters; the projection
//! matrix is rebuilt lazily on the next [`SceneCamera::projection`] call after
//! any of them changes.

use std::cell::Cell;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ecs::{AttachContext, Component};
use crate::foundation::math::{constants, Color, Mat4};

bitflags! {
    /// Buffers cleared before rendering through a camera
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u8 {
        /// Clear the color buffer with the camera's clear color
        const COLOR = 1 << 0;
        /// Clear the depth buffer
        const DEPTH = 1 << 1;
    }
}

impl Default for ClearFlags {
    fn default() -> Self {
        Self::COLOR | Self::DEPTH
    }
}

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProjectionType {
    /// Parallel projection sized by a vertical extent
    #[default]
    Orthographic,
    /// Perspective projection with a vertical field of view
    Perspective,
}

/// Camera parameters used by a scene
#[derive(Debug, Clone)]
pub struct SceneCamera {
    projection_type: ProjectionType,

    orthographic_size: f32,
    orthographic_near: f32,
    orthographic_far: f32,

    perspective_fov: f32,
    perspective_near: f32,
    perspective_far: f32,

    aspect_ratio: f32,

    /// Buffers to clear before rendering
    pub clear_flags: ClearFlags,
    /// Clear color used with [`ClearFlags::COLOR`]
    pub clear_color: Color,

    projection: Cell<Option<Mat4>>,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            projection_type: ProjectionType::Orthographic,
            orthographic_size: 10.0,
            orthographic_near: -1.0,
            orthographic_far: 1.0,
            perspective_fov: 45.0 * constants::DEG_TO_RAD,
            perspective_near: 0.01,
            perspective_far: 1000.0,
            aspect_ratio: 16.0 / 9.0,
            clear_flags: ClearFlags::default(),
            clear_color: Color::new(0.1, 0.1, 0.1, 1.0),
            projection: Cell::new(None),
        }
    }
}

impl PartialEq for SceneCamera {
    fn eq(&self, other: &Self) -> bool {
        self.projection_type == other.projection_type
            && self.orthographic_size == other.orthographic_size
            && self.orthographic_near == other.orthographic_near
            && self.orthographic_far == other.orthographic_far
            && self.perspective_fov == other.perspective_fov
            && self.perspective_near == other.perspective_near
            && self.perspective_far == other.perspective_far
            && self.aspect_ratio == other.aspect_ratio
            && self.clear_flags == other.clear_flags
            && self.clear_color == other.clear_color
    }
}

impl SceneCamera {
    /// Default orthographic camera
    pub fn new() -> Self {
        Self::default()
    }

    fn invalidate(&self) {
        self.projection.set(None);
    }

    /// Switch to orthographic projection
    pub fn set_orthographic(&mut self, size: f32, near: f32, far: f32) {
        self.projection_type = ProjectionType::Orthographic;
        self.orthographic_size = size;
        self.orthographic_near = near;
        self.orthographic_far = far;
        self.invalidate();
    }

    /// Switch to perspective projection (`fov` in radians)
    pub fn set_perspective(&mut self, fov: f32, near: f32, far: f32) {
        self.projection_type = ProjectionType::Perspective;
        self.perspective_fov = fov;
        self.perspective_near = near;
        self.perspective_far = far;
        self.invalidate();
    }

    /// Update the aspect ratio from a viewport size. Zero-sized viewports are ignored.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.set_aspect_ratio(width as f32 / height as f32);
    }

    /// Current projection model
    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Change the projection model
    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
        self.invalidate();
    }

    /// Vertical extent of the orthographic view volume
    pub fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    /// Set the vertical extent of the orthographic view volume
    pub fn set_orthographic_size(&mut self, size: f32) {
        self.orthographic_size = size;
        self.invalidate();
    }

    /// Vertical field of view in radians
    pub fn perspective_fov(&self) -> f32 {
        self.perspective_fov
    }

    /// Set the vertical field of view in radians
    pub fn set_perspective_fov(&mut self, fov: f32) {
        self.perspective_fov = fov;
        self.invalidate();
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Set width over height
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
        self.invalidate();
    }

    /// Near and far clip planes of the active projection
    pub fn clip_planes(&self) -> (f32, f32) {
        match self.projection_type {
            ProjectionType::Orthographic => (self.orthographic_near, self.orthographic_far),
            ProjectionType::Perspective => (self.perspective_near, self.perspective_far),
        }
    }

    /// True when the projection must be rebuilt on next access
    pub fn is_projection_dirty(&self) -> bool {
        self.projection.get().is_none()
    }

    /// Projection matrix, rebuilt if any parameter changed
    pub fn projection(&self) -> Mat4 {
        if let Some(projection) = self.projection.get() {
            return projection;
        }

        let projection = match self.projection_type {
            ProjectionType::Orthographic => {
                let half_height = self.orthographic_size * 0.5;
                let half_width = half_height * self.aspect_ratio;
                Mat4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.orthographic_near,
                    self.orthographic_far,
                )
            }
            ProjectionType::Perspective => Mat4::new_perspective(
                self.aspect_ratio,
                self.perspective_fov,
                self.perspective_near,
                self.perspective_far,
            ),
        };

        self.projection.set(Some(projection));
        projection
    }
}

/// Camera attached to an entity; the entity's world transform is the view
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraComponent {
    /// Projection and clear settings
    pub camera: SceneCamera,
    /// Keep the aspect ratio when the viewport resizes
    pub fixed_aspect_ratio: bool,
}

impl CameraComponent {
    /// Wrap a configured camera
    pub fn new(camera: SceneCamera) -> Self {
        Self {
            camera,
            fixed_aspect_ratio: false,
        }
    }

    /// Builder pattern: keep the aspect ratio fixed
    pub fn with_fixed_aspect_ratio(mut self, fixed: bool) -> Self {
        self.fixed_aspect_ratio = fixed;
        self
    }

    /// Forward a viewport resize unless the aspect ratio is fixed
    pub fn on_viewport_resized(&mut self, width: u32, height: u32) {
        if !self.fixed_aspect_ratio {
            self.camera.set_viewport_size(width, height);
        }
    }
}

impl Component for CameraComponent {
    const NAME: &'static str = "CameraComponent";

    fn duplicate(&self) -> Self {
        self.clone()
    }

    fn on_attach(&mut self, ctx: &AttachContext) {
        self.on_viewport_resized(ctx.viewport.0, ctx.viewport.1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_is_lazy() {
        let mut camera = SceneCamera::new();
        assert!(camera.is_projection_dirty());

        let _ = camera.projection();
        assert!(!camera.is_projection_dirty());

        camera.set_viewport_size(800, 800);
        assert!(camera.is_projection_dirty());
        assert_relative_eq!(camera.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_orthographic_extent() {
        let mut camera = SceneCamera::new();
        camera.set_orthographic(2.0, -1.0, 1.0);
        camera.set_aspect_ratio(1.0);

        // size 2 maps y in [-1, 1] onto NDC [-1, 1]
        let projection = camera.projection();
        assert_relative_eq!(projection[(1, 1)], 1.0);
        assert_relative_eq!(projection[(0, 0)], 1.0);
    }

    #[test]
    fn test_zero_viewport_is_ignored() {
        let mut camera = SceneCamera::new();
        let before = camera.aspect_ratio();
        camera.set_viewport_size(0, 720);
        assert_relative_eq!(camera.aspect_ratio(), before);
    }

    #[test]
    fn test_fixed_aspect_ignores_resize() {
        let mut component = CameraComponent::default().with_fixed_aspect_ratio(true);
        let before = component.camera.aspect_ratio();
        component.on_attach(&AttachContext {
            viewport: (100, 400),
            running: false,
        });
        assert_relative_eq!(component.camera.aspect_ratio(), before);
    }

    #[test]
    fn test_attach_takes_scene_viewport() {
        let mut component = CameraComponent::default();
        component.on_attach(&AttachContext {
            viewport: (400, 200),
            running: false,
        });
        assert_relative_eq!(component.camera.aspect_ratio(), 2.0);
    }
}
