use std::{
    collections::HashMap,
    io::{BufReader, Cursor},
    sync::Arc,
};

use crate::{
    data_structures::{
        model::{Material, Mesh, ModelVertex},
        scene::{SceneTemplate, TemplateNode, TemplatePrimitive},
        texture::Texture,
        transform::Transform,
    },
    resources::texture::{load_binary, load_texture, material_layout},
};

/**
 * This module contains all logic for loading mesh/textures/etc. from external
 * files and the cache of loaded scene templates.
 */
pub mod texture;

/// Cache of shared, immutable scene templates, keyed by source URL.
///
/// A hit skips the load entirely; entries are never mutated, only replaced
/// wholesale when the cache is dropped with its owner.
#[derive(Default)]
pub struct TemplateCache {
    templates: HashMap<String, Arc<SceneTemplate>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    pub fn get(&self, url: &str) -> Option<Arc<SceneTemplate>> {
        self.templates.get(url).cloned()
    }

    pub fn insert(&mut self, template: Arc<SceneTemplate>) {
        self.templates
            .insert(template.key().to_string(), template);
    }
}

/// Load a glTF/GLB model into a scene template.
///
/// Load failure is a recoverable condition reported to the caller; material
/// derivation on the other hand never fails hard — a material without a
/// base-color map falls back to its flat factor color and a primitive with no
/// material at all receives a neutral default.
pub async fn load_template(
    url: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<SceneTemplate> {
    let gltf_bytes = load_binary(url).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.into());
                };
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = material_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let name = material.name().unwrap_or("unnamed_material").to_string();
        let base_color = pbr.base_color_factor();
        let diffuse_texture = match pbr.base_color_texture() {
            Some(info) => {
                load_gltf_texture(&info.texture().source().source(), &buffer_data, device, queue, url)
                    .await
            }
            None => None,
        };
        let has_map = diffuse_texture.is_some();
        let diffuse_texture = diffuse_texture.unwrap_or_else(|| {
            Texture::create_solid_color([255, 255, 255, 255], device, queue, &name)
        });
        materials.push(Arc::new(Material::new(
            device,
            &name,
            diffuse_texture,
            base_color,
            has_map,
            material.double_sided(),
            &layout,
        )));
    }
    let neutral = Arc::new(Material::neutral(device, queue, &layout));

    let mut models = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            let model = to_template_node(node, &buffer_data, device, &materials, &neutral);
            models.push(model);
        }
    }

    let root = if models.len() == 1 {
        models.into_iter().next().unwrap()
    } else {
        let mut root = TemplateNode::new(url.to_string(), Transform::new());
        root.children = models;
        root
    };

    Ok(SceneTemplate::new(url, root))
}

/// Decode one referenced base-color image; a broken or missing image degrades
/// to the flat factor color instead of failing the whole load.
async fn load_gltf_texture(
    source: &gltf::image::Source<'_>,
    buffer_data: &[Vec<u8>],
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    file_name: &str,
) -> Option<Texture> {
    let loaded = match source {
        gltf::image::Source::View { view, mime_type } => Texture::from_bytes(
            device,
            queue,
            &buffer_data[view.buffer().index()],
            file_name,
            mime_type.split('/').last(),
        ),
        gltf::image::Source::Uri { uri, mime_type } => {
            let format = mime_type.and_then(|mt| mt.split('/').last());
            load_texture(uri, device, queue, format).await
        }
    };
    match loaded {
        Ok(texture) => Some(texture),
        Err(e) => {
            log::warn!("Couldn't decode diffuse texture of {}: {}", file_name, e);
            None
        }
    }
}

fn to_template_node(
    node: gltf::scene::Node,
    buf: &Vec<Vec<u8>>,
    device: &wgpu::Device,
    materials: &Vec<Arc<Material>>,
    neutral: &Arc<Material>,
) -> TemplateNode {
    let decomp = node.transform().decomposed();
    let transform = Transform {
        position: decomp.0.into(),
        rotation: decomp.1.into(),
        scale: decomp.2.into(),
    };
    let name = node.name().unwrap_or("unnamed_node").to_string();
    let mut template_node = TemplateNode::new(name, transform);

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("unknown_mesh").to_string();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buf[buffer.index()]));

            let mut vertices = Vec::new();
            if let Some(vertex_attribute) = reader.read_positions() {
                vertex_attribute.for_each(|vertex| {
                    vertices.push(ModelVertex {
                        position: vertex,
                        tex_coords: Default::default(),
                        normal: Default::default(),
                    })
                });
            }
            if let Some(normal_attribute) = reader.read_normals() {
                let mut normal_index = 0;
                normal_attribute.for_each(|normal| {
                    vertices[normal_index].normal = normal;

                    normal_index += 1;
                });
            }
            if let Some(tex_coord_attribute) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                let mut tex_coord_index = 0;
                tex_coord_attribute.for_each(|tex_coord| {
                    vertices[tex_coord_index].tex_coords = tex_coord;

                    tex_coord_index += 1;
                });
            }

            let mut indices = Vec::new();
            if let Some(indices_raw) = reader.read_indices() {
                indices.append(&mut indices_raw.into_u32().collect::<Vec<u32>>());
            }

            let material = primitive
                .material()
                .index()
                .and_then(|idx| materials.get(idx).cloned())
                .unwrap_or_else(|| neutral.clone());

            template_node.primitives.push(TemplatePrimitive {
                mesh: Mesh::new(device, &mesh_name, &vertices, &indices),
                material,
            });
        }
    }
    for child in node.children() {
        let child_node = to_template_node(child, buf, device, materials, neutral);
        template_node.children.push(child_node);
    }

    template_node
}
