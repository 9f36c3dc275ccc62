use approx::assert_relative_eq;

use super::RecordingRenderer;
use crate::ecs::components::{CameraComponent, SceneCamera, SpriteRendererComponent, TextureRef, TransformComponent};
use crate::foundation::math::{Vec3, Vec4};
use crate::render::{RenderError, SceneRenderer2D};
use crate::scene::{Scene, SceneError};

fn add_camera(scene: &mut Scene, position: Vec3) -> crate::ecs::Entity {
    let camera = scene.create_entity("Camera");
    scene
        .get_component_mut::<TransformComponent>(camera)
        .unwrap()
        .set_local_position(position);
    scene.add_component(camera, CameraComponent::new(SceneCamera::new())).unwrap();
    camera
}

#[test]
fn test_render_without_camera_is_skipped() {
    let mut scene = Scene::default();
    let sprite = scene.create_entity("Sprite");
    scene.add_component(sprite, SpriteRendererComponent::default()).unwrap();

    let mut renderer = RecordingRenderer::default();
    assert_eq!(scene.on_render(&mut renderer), Ok(false));
    assert!(renderer.cameras.is_empty());
    assert!(renderer.sprites.is_empty());
    assert_eq!(renderer.ended, 0);
}

#[test]
fn test_render_submits_sprites_in_world_space() {
    let mut scene = Scene::default();
    let camera = add_camera(&mut scene, Vec3::new(0.0, 0.0, 5.0));

    let parent = scene.create_entity("Parent");
    scene
        .get_component_mut::<TransformComponent>(parent)
        .unwrap()
        .set_local_position(Vec3::new(1.0, 0.0, 0.0));
    let child = scene.create_child_entity(parent, "Child").unwrap();
    scene
        .get_component_mut::<TransformComponent>(child)
        .unwrap()
        .set_local_position(Vec3::new(0.0, 1.0, 0.0));
    let tint = Vec4::new(1.0, 0.0, 0.0, 1.0);
    scene
        .add_component(child, SpriteRendererComponent::textured(TextureRef::new(9)).with_tint(tint))
        .unwrap();

    let mut renderer = RecordingRenderer::default();
    assert_eq!(scene.on_render(&mut renderer), Ok(true));

    assert_eq!(renderer.cameras.len(), 1);
    assert_eq!(renderer.cameras[0].entity, camera);
    assert_eq!(renderer.ended, 1);
    assert_eq!(renderer.sprites.len(), 1);

    let draw = &renderer.sprites[0];
    assert_eq!(draw.entity, child);
    assert_eq!(draw.texture, Some(TextureRef::new(9)));
    assert_relative_eq!(draw.tint, tint);
    let origin = draw.transform * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert_relative_eq!(origin, Vec4::new(1.0, 1.0, 0.0, 1.0), epsilon = 1e-6);

    // The view moves the camera to the origin
    let frame = &renderer.cameras[0];
    let eye = frame.view * Vec4::new(0.0, 0.0, 5.0, 1.0);
    assert_relative_eq!(eye, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
    assert_relative_eq!(frame.view_projection, frame.projection * frame.view);
}

#[test]
fn test_disabled_sprites_and_cameras_are_skipped() {
    let mut scene = Scene::default();
    let first = add_camera(&mut scene, Vec3::zeros());
    let second = add_camera(&mut scene, Vec3::new(3.0, 0.0, 0.0));
    let sprite = scene.create_entity("Sprite");
    scene.add_component(sprite, SpriteRendererComponent::default()).unwrap();

    scene.set_component_enabled::<CameraComponent>(first, false).unwrap();
    scene.set_component_enabled::<SpriteRendererComponent>(sprite, false).unwrap();
    assert_eq!(scene.primary_camera(), Some(second));

    let mut renderer = RecordingRenderer::default();
    assert_eq!(scene.on_render(&mut renderer), Ok(false));
    assert_eq!(renderer.cameras[0].entity, second);
    assert!(renderer.sprites.is_empty());
    assert_eq!(renderer.ended, 1);
}

#[test]
fn test_viewport_resizes_free_cameras() {
    let mut scene = Scene::default();
    let free = add_camera(&mut scene, Vec3::zeros());
    let fixed = scene.create_entity("Fixed");
    scene
        .add_component(fixed, CameraComponent::new(SceneCamera::new()).with_fixed_aspect_ratio(true))
        .unwrap();
    let fixed_aspect = scene.get_component::<CameraComponent>(fixed).unwrap().camera.aspect_ratio();

    scene.set_viewport_size(800, 400);

    assert_eq!(scene.viewport_size(), (800, 400));
    assert_relative_eq!(scene.get_component::<CameraComponent>(free).unwrap().camera.aspect_ratio(), 2.0);
    assert_relative_eq!(
        scene.get_component::<CameraComponent>(fixed).unwrap().camera.aspect_ratio(),
        fixed_aspect
    );

    // Cameras attached later pick up the stored viewport
    let late = add_camera(&mut scene, Vec3::zeros());
    assert_relative_eq!(scene.get_component::<CameraComponent>(late).unwrap().camera.aspect_ratio(), 2.0);
}

struct FailingRenderer;

impl SceneRenderer2D for FailingRenderer {
    fn begin_scene(&mut self, _camera: &crate::render::CameraFrame) -> Result<(), RenderError> {
        Ok(())
    }

    fn submit_sprite(&mut self, _sprite: &crate::render::SpriteDraw) -> Result<(), RenderError> {
        Err(RenderError::Submission("out of quads".into()))
    }

    fn end_scene(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

#[test]
fn test_renderer_errors_propagate() {
    let mut scene = Scene::default();
    add_camera(&mut scene, Vec3::zeros());
    let sprite = scene.create_entity("Sprite");
    scene.add_component(sprite, SpriteRendererComponent::default()).unwrap();

    assert_eq!(
        scene.on_render(&mut FailingRenderer),
        Err(SceneError::Render(RenderError::Submission("out of quads".into())))
    );
}
