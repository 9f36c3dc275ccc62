//! Falling crates demo
//!
//! Headless host for the scene runtime: builds a small scene with a static
//! floor, a handful of dynamic crates and a camera, then drives it at a fixed
//! rate, logging collisions and the sprites each frame would draw.
//!
//! Usage: `falling_crates [config.toml|config.ron]`

use rand::Rng;
use scene_runtime::foundation::logging;
use scene_runtime::prelude::*;

/// Renderer that only counts and logs what it receives
#[derive(Default)]
struct LogRenderer {
    frames: u64,
    sprites: usize,
}

impl SceneRenderer2D for LogRenderer {
    fn begin_scene(&mut self, camera: &CameraFrame) -> Result<(), RenderError> {
        self.frames += 1;
        self.sprites = 0;
        log::trace!("Frame {} through {}", self.frames, camera.entity);
        Ok(())
    }

    fn submit_sprite(&mut self, sprite: &SpriteDraw) -> Result<(), RenderError> {
        self.sprites += 1;
        log::trace!("  sprite {} at {:?}", sprite.entity, sprite.transform.column(3));
        Ok(())
    }

    fn end_scene(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Counts landings and recolors the crate on impact
#[derive(Default)]
struct CrateScript {
    landings: u32,
}

impl ScriptableEntity for CrateScript {
    fn on_create(&mut self, ctx: &mut ScriptContext<'_>) {
        log::debug!("Crate {} ready", ctx.entity());
    }

    fn on_collision_enter(&mut self, ctx: &mut ScriptContext<'_>, collision: &Collision2D) {
        self.landings += 1;
        let other = ctx.scene().name(collision.other).unwrap_or("?").to_string();
        log::info!("{} hit {} (landing #{})", ctx.entity(), other, self.landings);

        if let Some(sprite) = ctx.get_mut::<SpriteRendererComponent>() {
            sprite.tint = Vec4::new(1.0, 0.3, 0.3, 1.0);
        }
    }

    fn on_destroy(&mut self, ctx: &mut ScriptContext<'_>) {
        log::debug!("Crate {} landed {} times", ctx.entity(), self.landings);
    }
}

impl NativeScript for CrateScript {
    const NAME: &'static str = "CrateScript";
}

fn build_scene(config: &EngineConfig) -> Result<Scene, SceneError> {
    let mut scene = Scene::new(config.scene.clone());
    scene.set_viewport_size(config.viewport.0, config.viewport.1);

    let camera = scene.create_entity("Camera");
    let mut scene_camera = SceneCamera::new();
    scene_camera.set_orthographic(20.0, -1.0, 1.0);
    scene.add_component(camera, CameraComponent::new(scene_camera))?;

    let floor = scene.create_entity("Floor");
    {
        let transform = scene.get_component_mut::<TransformComponent>(floor)?;
        transform.set_local_position(Vec3::new(0.0, -8.0, 0.0));
        transform.set_local_scale(Vec3::new(20.0, 1.0, 1.0));
    }
    scene.add_component(floor, SpriteRendererComponent::new(Vec4::new(0.4, 0.4, 0.4, 1.0)))?;
    scene.add_component(floor, RigidBody2DComponent::new(RigidBody2DProps::fixed()))?;
    scene.add_component(floor, Colliders2DComponent::new().with_collider(Collider2DProps::boxed(20.0, 1.0)))?;

    let stack = scene.create_entity("Stack");
    let mut rng = rand::thread_rng();
    for i in 0..5u8 {
        let crate_entity = scene.create_child_entity(stack, &format!("Crate {i}"))?;
        let x = rng.gen_range(-6.0..6.0);
        let y = 2.0 + f32::from(i) * 2.5;
        scene
            .get_component_mut::<TransformComponent>(crate_entity)?
            .set_local_position(Vec3::new(x, y, 0.0));
        scene.add_component(crate_entity, SpriteRendererComponent::new(Vec4::new(0.8, 0.6, 0.3, 1.0)))?;
        scene.add_component(crate_entity, RigidBody2DComponent::new(RigidBody2DProps::dynamic(1.0)))?;
        scene.add_component(
            crate_entity,
            Colliders2DComponent::new().with_collider(Collider2DProps::boxed(1.0, 1.0)),
        )?;
        scene.add_script::<CrateScript>(crate_entity)?;
    }

    Ok(scene)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "demo.toml".to_string());
    let config = EngineConfig::load_or_default(&config_path)?;
    config.validate()?;
    logging::init(&config.log_level);

    log::info!("Starting falling crates demo at {} Hz", config.fixed_update_hz);
    let mut scene = build_scene(&config)?;
    let mut renderer = LogRenderer::default();
    let step = TimeStep::from_hz(config.fixed_update_hz);
    let mut timer = Timer::new();

    scene.on_scene_play()?;
    let mut frame = 0u64;
    while config.max_frames == 0 || frame < config.max_frames {
        scene.on_update(step)?;
        scene.on_render(&mut renderer)?;
        timer.update();
        frame += 1;
    }
    scene.on_scene_stop()?;

    log::info!(
        "Simulated {} frames ({} rendered, {} sprites in the last), {:.1} host fps",
        frame,
        renderer.frames,
        renderer.sprites,
        timer.average_fps()
    );
    Ok(())
}
