//! Renders a screen-covering quad through the dissolve pass and checks the
//! dither pattern against the clear colour: roughly half the pixels survive
//! at progress 0.5, all of them once the reveal completes.

#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_dither_half_the_pixels_at_half_progress() {
    use instant::Duration;
    use reveal_ngin::{
        camera::Camera,
        context::{Context, InitContext},
        data_structures::{
            model::{Material, Mesh, ModelVertex},
            texture::Texture,
            transform::Transform,
        },
        pipelines::dissolve::DissolveMaterial,
        render::{MeshDraw, Pass, Render},
        resources::texture::material_layout,
        view::{self, FlowConstructor, ImageTestResult, Out, ViewFlow},
    };
    use wgpu::util::DeviceExt;

    use crate::common::test_utils::FrameCounter;

    struct DissolveQuad {
        mesh: Mesh,
        transform_buffer: wgpu::Buffer,
        dissolve: DissolveMaterial,
    }

    impl DissolveQuad {
        fn new(gpu: &InitContext) -> Self {
            // Large enough to cover the whole viewport from the test camera
            let vertices = [
                ModelVertex {
                    position: [-4.0, -4.0, 0.0],
                    tex_coords: [0.0, 0.0],
                    normal: [0.0, 0.0, -1.0],
                },
                ModelVertex {
                    position: [4.0, -4.0, 0.0],
                    tex_coords: [1.0, 0.0],
                    normal: [0.0, 0.0, -1.0],
                },
                ModelVertex {
                    position: [4.0, 4.0, 0.0],
                    tex_coords: [1.0, 1.0],
                    normal: [0.0, 0.0, -1.0],
                },
                ModelVertex {
                    position: [-4.0, 4.0, 0.0],
                    tex_coords: [0.0, 1.0],
                    normal: [0.0, 0.0, -1.0],
                },
            ];
            let mesh = Mesh::new(&gpu.device, "quad", &vertices, &[0, 1, 2, 0, 2, 3]);
            let transform_buffer =
                gpu.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Quad Transform Buffer"),
                        contents: bytemuck::cast_slice(&[Transform::new().to_raw()]),
                        usage: wgpu::BufferUsages::VERTEX,
                    });

            let layout = material_layout(&gpu.device);
            let white =
                Texture::create_solid_color([255, 255, 255, 255], &gpu.device, &gpu.queue, "flat");
            let original = Material::new(
                &gpu.device,
                "flat",
                white,
                [0.8, 0.1, 0.1, 1.0],
                false,
                false,
                &layout,
            );
            let mut dissolve = DissolveMaterial::from_original(&gpu.device, &original, &layout);
            dissolve.set_progress(&gpu.queue, 0.5);

            Self {
                mesh,
                transform_buffer,
                dissolve,
            }
        }
    }

    impl ViewFlow<FrameCounter, ()> for DissolveQuad {
        fn on_init(&mut self, ctx: &mut Context, _: &mut FrameCounter) -> Out<()> {
            ctx.clear_colour = wgpu::Color::WHITE;
            ctx.camera.camera = Camera::new(
                (0.0, 0.0, 0.0),
                3.0,
                cgmath::Deg(-90.0),
                cgmath::Deg(0.0),
            );
            Out::Empty
        }

        fn on_update(
            &mut self,
            ctx: &Context,
            state: &mut FrameCounter,
            _: Duration,
        ) -> Out<()> {
            state.progress();
            if state.frame() >= 2 {
                self.dissolve.set_progress(&ctx.queue, 1.0);
            }
            Out::Empty
        }

        fn on_device_events(
            &mut self,
            _: &Context,
            _: &mut FrameCounter,
            _: &reveal_ngin::DeviceEvent,
        ) -> Out<()> {
            Out::Empty
        }

        fn on_window_events(
            &mut self,
            _: &Context,
            _: &mut FrameCounter,
            _: &reveal_ngin::WindowEvent,
        ) -> Out<()> {
            Out::Empty
        }

        fn on_custom_events(&mut self, _: &Context, _: &mut FrameCounter, event: ()) -> Option<()> {
            Some(event)
        }

        fn on_render(&self) -> Render<'_> {
            Render::Draw(MeshDraw {
                mesh: &self.mesh,
                transform: &self.transform_buffer,
                material: &self.dissolve.bind_group,
                two_sided: true,
                pass: Pass::Dissolve,
            })
        }

        fn render_to_texture(
            &self,
            _: &Context,
            state: &mut FrameCounter,
            texture: &mut image::ImageBuffer<image::Rgba<u8>, wgpu::BufferView>,
        ) -> Result<ImageTestResult, anyhow::Error> {
            let total = (texture.width() * texture.height()) as f32;
            let background = texture
                .pixels()
                .filter(|pixel| pixel.0[0] == 255 && pixel.0[1] == 255 && pixel.0[2] == 255)
                .count() as f32;
            let fraction = background / total;
            match state.frame() {
                // Half of the sixteen Bayer thresholds lie below 0.5, so
                // about half of each 4x4 cell block is discarded
                1 => {
                    assert!(
                        (0.2..0.8).contains(&fraction),
                        "expected a partial dither, got background fraction {}",
                        fraction
                    );
                    Ok(ImageTestResult::Waiting)
                }
                // Fully revealed: the discard test is skipped and the quad
                // covers every pixel
                n if n >= 3 => {
                    assert_eq!(fraction, 0.0, "background still visible at progress 1.0");
                    Ok(ImageTestResult::Passed)
                }
                _ => Ok(ImageTestResult::Waiting),
            }
        }
    }

    let constructor: FlowConstructor<FrameCounter, ()> = Box::new(|ctx| {
        Box::pin(async move {
            Box::new(DissolveQuad::new(&ctx)) as Box<dyn ViewFlow<FrameCounter, ()>>
        })
    });

    view::run(vec![constructor]).expect("Failed to run flow for integration test.");
}
