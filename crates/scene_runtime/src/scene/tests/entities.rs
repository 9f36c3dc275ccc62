use approx::assert_relative_eq;

use crate::ecs::components::{IdComponent, NameComponent, SpriteRendererComponent, TransformComponent};
use crate::foundation::logging;
use crate::foundation::math::{white, Vec3};
use crate::scene::{Scene, SceneError};

#[test]
fn test_new_entity_has_default_components() {
    logging::init_test();
    let mut scene = Scene::default();
    let player = scene.create_entity("Player");

    assert!(scene.is_valid(player));
    assert_eq!(scene.name(player).unwrap(), "Player");
    assert_eq!(
        scene.component_names(player).unwrap(),
        vec!["IdComponent", "NameComponent", "TransformComponent"]
    );
    assert_eq!(scene.root_entities(), vec![player]);
    assert!(player.has::<TransformComponent>(&scene).unwrap());
    player.get_mut::<NameComponent>(&mut scene).unwrap().name = "Hero".to_string();
    assert_eq!(player.get::<NameComponent>(&scene).unwrap().name, "Hero");
    assert_eq!(scene.entity_by_uuid(scene.uuid(player).unwrap()), Some(player));
    assert!(player.is_valid(&scene));
}

#[test]
fn test_duplicate_component_is_rejected() {
    let mut scene = Scene::default();
    let entity = scene.create_entity("Box");

    let result = scene.add_component(entity, TransformComponent::new());
    assert!(matches!(result, Err(SceneError::DuplicateComponent { .. })));

    scene.add_component(entity, SpriteRendererComponent::new(white())).unwrap();
    let result = scene.add_component(entity, SpriteRendererComponent::default());
    assert_eq!(
        result.err(),
        Some(SceneError::DuplicateComponent {
            entity,
            component: "SpriteRendererComponent",
        })
    );
}

#[test]
fn test_duplicate_uuid_is_rejected() {
    let mut scene = Scene::default();
    let first = scene.create_entity_with_uuid("First", 42).unwrap();

    assert_eq!(scene.create_entity_with_uuid("Second", 42), Err(SceneError::DuplicateUuid(42)));
    assert_eq!(scene.entity_by_uuid(42), Some(first));
    assert_eq!(scene.entity_count(), 1);
}

#[test]
fn test_removing_id_component_frees_uuid() {
    let mut scene = Scene::default();
    let entity = scene.create_entity_with_uuid("Tagged", 7).unwrap();

    scene.remove_component::<IdComponent>(entity).unwrap();
    assert_eq!(scene.entity_by_uuid(7), None);

    let other = scene.create_entity_with_uuid("Other", 7).unwrap();
    assert_eq!(scene.entity_by_uuid(7), Some(other));
    assert!(matches!(
        scene.add_component(entity, IdComponent::new(7)),
        Err(SceneError::DuplicateUuid(7))
    ));
}

#[test]
fn test_stale_and_foreign_handles() {
    logging::init_test();
    let mut scene = Scene::default();
    let mut other_scene = Scene::default();

    let entity = scene.create_entity("Doomed");
    let foreign = other_scene.create_entity("Elsewhere");
    scene.destroy_entity(entity).unwrap();

    assert!(!scene.is_valid(entity));
    assert_eq!(
        scene.get_component::<TransformComponent>(entity).err(),
        Some(SceneError::StaleEntity(entity))
    );
    assert_eq!(scene.destroy_entity(entity), Err(SceneError::StaleEntity(entity)));
    assert!(scene.try_get_component::<TransformComponent>(entity).is_none());

    assert_eq!(
        scene.has_component::<TransformComponent>(foreign),
        Err(SceneError::ForeignEntity(foreign))
    );
    assert!(other_scene.is_valid(foreign));

    // The slot is reused with a new generation; the old handle stays dead
    let reused = scene.create_entity("Reused");
    assert_eq!(reused.id().index(), entity.id().index());
    assert!(!scene.is_valid(entity));
    assert!(scene.is_valid(reused));
}

#[test]
fn test_missing_component_is_reported() {
    let mut scene = Scene::default();
    let entity = scene.create_entity("Plain");

    assert!(matches!(
        scene.get_component::<SpriteRendererComponent>(entity),
        Err(SceneError::MissingComponent { .. })
    ));
    assert!(matches!(
        scene.remove_component::<SpriteRendererComponent>(entity),
        Err(SceneError::MissingComponent { .. })
    ));
    assert!(scene.try_get_component::<SpriteRendererComponent>(entity).is_none());
    assert!(!scene.has_component::<SpriteRendererComponent>(entity).unwrap());
}

#[test]
fn test_destroy_cascades_to_children() {
    let mut scene = Scene::default();
    let root = scene.create_entity("Root");
    let child = scene.create_child_entity(root, "Child").unwrap();
    let grandchild = scene.create_child_entity(child, "Grandchild").unwrap();
    let sibling = scene.create_entity("Sibling");

    scene.destroy_entity(child).unwrap();

    assert!(!scene.is_valid(child));
    assert!(!scene.is_valid(grandchild));
    assert!(scene.children(root).unwrap().is_empty());
    assert_eq!(scene.entity_count(), 2);
    assert!(scene.hierarchy().is_consistent());

    scene.destroy_entity(root).unwrap();
    assert_eq!(scene.root_entities(), vec![sibling]);
    assert_eq!(scene.hierarchy().len(), 1);
    assert!(scene.hierarchy().is_consistent());
}

#[test]
fn test_reparenting_rejects_cycles() {
    let mut scene = Scene::default();
    let a = scene.create_entity("A");
    let b = scene.create_child_entity(a, "B").unwrap();
    let c = scene.create_child_entity(b, "C").unwrap();

    assert_eq!(
        scene.set_parent(a, c),
        Err(SceneError::HierarchyCycle { parent: c, child: a })
    );
    assert!(matches!(scene.set_parent(b, b), Err(SceneError::HierarchyCycle { .. })));

    scene.detach(c).unwrap();
    assert_eq!(scene.parent(c).unwrap(), None);
    scene.set_parent(a, c).unwrap();
    assert_eq!(scene.parent(a).unwrap(), Some(c));
    assert_eq!(scene.root_entities(), vec![c]);
    assert!(scene.hierarchy().is_consistent());
}

#[test]
fn test_child_world_transform_follows_parent() {
    let mut scene = Scene::default();
    let parent = scene.create_entity("Parent");
    let child = scene.create_child_entity(parent, "Child").unwrap();

    scene
        .get_component_mut::<TransformComponent>(parent)
        .unwrap()
        .set_local_position(Vec3::new(1.0, 0.0, 0.0));
    scene
        .get_component_mut::<TransformComponent>(child)
        .unwrap()
        .set_local_position(Vec3::new(0.0, 1.0, 0.0));

    let world = scene.world_transform(child).unwrap();
    assert_relative_eq!(world.position, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-6);

    scene.update_world_transforms();
    let cached = scene.get_component::<TransformComponent>(child).unwrap();
    assert_relative_eq!(cached.world_position(), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-6);
    assert!(!cached.is_dirty());

    // Moving the parent invalidates the child on the next pass
    scene
        .get_component_mut::<TransformComponent>(parent)
        .unwrap()
        .set_local_position(Vec3::new(5.0, 0.0, 0.0));
    scene.update_world_transforms();
    let cached = scene.get_component::<TransformComponent>(child).unwrap();
    assert_relative_eq!(cached.world_position(), Vec3::new(5.0, 1.0, 0.0), epsilon = 1e-6);
}

#[test]
fn test_component_enable_flags_and_view() {
    let mut scene = Scene::default();
    let a = scene.create_entity("A");
    let b = scene.create_entity("B");
    scene.add_component(a, SpriteRendererComponent::default()).unwrap();
    scene.add_component(b, SpriteRendererComponent::default()).unwrap();

    scene.set_component_enabled::<SpriteRendererComponent>(b, false).unwrap();
    assert!(scene.is_component_enabled::<SpriteRendererComponent>(a).unwrap());
    assert!(!scene.is_component_enabled::<SpriteRendererComponent>(b).unwrap());

    let enabled: Vec<_> = scene
        .view::<SpriteRendererComponent>()
        .filter(|slot| slot.is_enabled())
        .map(|slot| slot.owner())
        .collect();
    assert_eq!(enabled, vec![a]);
    assert_eq!(scene.view::<TransformComponent>().count(), 2);
}

#[test]
fn test_duplicate_entity_copies_subtree() {
    let mut scene = Scene::default();
    let root = scene.create_entity("Root");
    let ship = scene.create_child_entity(root, "Ship").unwrap();
    let turret = scene.create_child_entity(ship, "Turret").unwrap();
    scene.add_component(turret, SpriteRendererComponent::default()).unwrap();

    let copy = scene.duplicate_entity(ship).unwrap();

    assert_ne!(copy, ship);
    assert_eq!(scene.name(copy).unwrap(), "Ship");
    assert_eq!(scene.parent(copy).unwrap(), Some(root));
    assert_eq!(scene.children(root).unwrap(), vec![ship, copy]);
    assert_ne!(scene.uuid(copy).unwrap(), scene.uuid(ship).unwrap());

    let copied_children = scene.children(copy).unwrap();
    assert_eq!(copied_children.len(), 1);
    let turret_copy = copied_children[0];
    assert_ne!(turret_copy, turret);
    assert!(scene.has_component::<SpriteRendererComponent>(turret_copy).unwrap());
    assert_eq!(scene.entity_by_uuid(scene.uuid(turret_copy).unwrap()), Some(turret_copy));
    assert_eq!(scene.entity_count(), 5);
    assert!(scene.hierarchy().is_consistent());
}

#[test]
fn test_duplicate_scene_has_disjoint_handles() {
    let mut scene = Scene::default();
    let parent = scene.create_entity_with_uuid("Parent", 1).unwrap();
    let child = scene.create_child_entity_with_uuid(parent, "Child", 2).unwrap();
    scene.add_component(child, SpriteRendererComponent::default()).unwrap();

    let mut copy = scene.duplicate();

    assert_ne!(copy.id(), scene.id());
    assert_eq!(copy.entity_count(), 2);
    assert!(!copy.is_valid(child));
    assert_eq!(copy.get_component::<NameComponent>(child).err(), Some(SceneError::ForeignEntity(child)));

    let copied_child = copy.entity_by_uuid(2).unwrap();
    assert_eq!(copied_child.scene(), copy.id());
    assert_eq!(copied_child.id(), child.id());
    assert_eq!(copy.name(copied_child).unwrap(), "Child");
    assert!(copy.has_component::<SpriteRendererComponent>(copied_child).unwrap());

    // Changing the copy leaves the original alone
    copy.destroy_entity(copied_child).unwrap();
    assert!(scene.is_valid(child));
    assert_eq!(scene.entity_count(), 2);
}
