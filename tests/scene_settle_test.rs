#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_settle_every_mesh_and_stay_settled() {
    use instant::Duration;
    use reveal_ngin::{
        data_structures::{
            model::{Material, Mesh, ModelVertex},
            scene::{SceneTemplate, TemplateNode, TemplatePrimitive},
            texture::Texture,
            transform::Transform,
        },
        render::Pass,
        resources::texture::material_layout,
        reveal::RevealState,
    };
    use std::sync::Arc;

    let (device, queue) = common::test_utils::create_headless_device();
    let layout = material_layout(&device);

    let white = Texture::create_solid_color([255, 255, 255, 255], &device, &queue, "flat");
    let material = Arc::new(Material::new(
        &device,
        "flat",
        white,
        [0.5, 0.2, 0.2, 1.0],
        false,
        false,
        &layout,
    ));
    let vertices = [
        ModelVertex {
            position: [0.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [1.0, 0.0, 0.0],
            tex_coords: [1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [0.0, 1.0, 0.0],
            tex_coords: [0.0, 1.0],
            normal: [0.0, 0.0, 1.0],
        },
    ];
    let mesh = Mesh::new(&device, "tri", &vertices, &[0, 1, 2]);

    let mut root = TemplateNode::new("root".to_string(), Transform::new());
    for name in ["part_a", "part_b"] {
        let mut child = TemplateNode::new(name.to_string(), Transform::new());
        child.primitives.push(TemplatePrimitive {
            mesh: mesh.clone(),
            material: material.clone(),
        });
        root.children.push(child);
    }
    let template = SceneTemplate::new("parts/test.glb", root);

    let mut instance = template.instantiate(&device);
    assert_eq!(instance.progress(), 0.0);
    assert!(!instance.is_settled());
    assert!(
        instance
            .get_render()
            .iter()
            .all(|draw| draw.pass == Pass::Dissolve)
    );

    instance.tick(&queue, Duration::from_secs_f32(0.3));
    assert!(instance.progress() > 0.0);
    assert!(instance.progress() < 1.0);
    assert!(!instance.is_settled());

    instance.tick(&queue, Duration::from_secs_f32(0.4));
    assert_eq!(instance.progress(), 1.0);
    assert!(instance.is_settled());
    assert!(
        instance
            .get_render()
            .iter()
            .all(|draw| draw.pass == Pass::Model)
    );

    // Re-running the completion check must not disturb the settled state
    instance.tick(&queue, Duration::from_secs_f32(0.016));
    assert_eq!(instance.progress(), 1.0);
    assert!(instance.is_settled());

    // A fresh clone of the same template starts over at zero
    let fresh = template.instantiate(&device);
    assert_eq!(fresh.progress(), 0.0);
    assert!(!fresh.is_settled());
    assert_eq!(fresh.key(), instance.key());
}

/// Only the first captured material drives the dissolve pass of a
/// multi-material mesh; the full list comes back on settle.
#[test]
#[cfg(feature = "integration-tests")]
fn should_dissolve_multi_material_meshes_with_first_material() {
    use instant::Duration;
    use reveal_ngin::{
        data_structures::{
            model::{Material, Mesh, ModelVertex},
            scene::{SceneTemplate, TemplateNode, TemplatePrimitive},
            texture::Texture,
            transform::Transform,
        },
        resources::texture::material_layout,
    };
    use std::sync::Arc;

    let (device, queue) = common::test_utils::create_headless_device();
    let layout = material_layout(&device);

    let mk_material = |name: &str, double_sided: bool| {
        let white = Texture::create_solid_color([255, 255, 255, 255], &device, &queue, name);
        Arc::new(Material::new(
            &device,
            name,
            white,
            [1.0, 1.0, 1.0, 1.0],
            false,
            double_sided,
            &layout,
        ))
    };
    let first = mk_material("first", false);
    let second = mk_material("second", true);

    let vertices = [
        ModelVertex {
            position: [0.0, 0.0, 0.0],
            tex_coords: [0.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [1.0, 0.0, 0.0],
            tex_coords: [1.0, 0.0],
            normal: [0.0, 0.0, 1.0],
        },
        ModelVertex {
            position: [0.0, 1.0, 0.0],
            tex_coords: [0.0, 1.0],
            normal: [0.0, 0.0, 1.0],
        },
    ];
    let mesh = Mesh::new(&device, "tri", &vertices, &[0, 1, 2]);

    let mut node = TemplateNode::new("multi".to_string(), Transform::new());
    node.primitives.push(TemplatePrimitive {
        mesh: mesh.clone(),
        material: first.clone(),
    });
    node.primitives.push(TemplatePrimitive {
        mesh: mesh.clone(),
        material: second.clone(),
    });
    let template = SceneTemplate::new("parts/multi.glb", node);

    let mut instance = template.instantiate(&device);
    // While dissolving both primitives share the pass derived from the first
    // material, including its culling mode
    assert!(instance.get_render().iter().all(|draw| !draw.two_sided));

    instance.tick(&queue, Duration::from_secs_f32(1.0));
    assert!(instance.is_settled());
    // Settling restores the authored per-primitive materials
    let sides: Vec<bool> = instance
        .get_render()
        .iter()
        .map(|draw| draw.two_sided)
        .collect();
    assert_eq!(sides, vec![false, true]);
}
