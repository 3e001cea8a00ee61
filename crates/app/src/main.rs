//! Demo application: a spinning cube scene with a shadow-casting light.
//!
//! Drives the renderer through winit's `ApplicationHandler`. The window and
//! renderer are created on `resumed`, each redraw records one frame, and
//! `about_to_wait` requests the next redraw so the loop runs continuously.

use anyhow::Result;
use glam::{Quat, Vec3, Vec4};
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use glint_core::Timer;
use glint_platform::Window;
use glint_renderer::{FrameStatus, MeshHandle, Renderer, RendererConfig, SubmeshDesc};
use glint_resources::{MeshData, TextureData};
use glint_rhi::vertex::Vertex;
use glint_scene::{Camera, MainLight, PointLight, Renderable, Transform};

/// The demo's scene content: one cube mesh drawn several times.
struct DemoScene {
    camera: Camera,
    light: MainLight,
    point_lights: Vec<PointLight>,
    renderables: Vec<Renderable>,
}

impl DemoScene {
    /// Uploads the cube mesh and checkerboard material, then lays out a
    /// floor slab and three cubes above it.
    fn build(renderer: &mut Renderer, width: u32, height: u32) -> Result<Self> {
        let checker = TextureData::checkerboard(8, 32, [210, 210, 210, 255], [60, 60, 70, 255]);
        let material = renderer.create_material(&checker.pixels, checker.width, checker.height)?;

        let cube = MeshData::unit_cube();
        let vertices: Vec<Vertex> = (0..cube.vertex_count())
            .map(|i| Vertex::new(cube.positions[i], cube.colors[i], cube.tex_coords[i]))
            .collect();
        let mesh = renderer.create_mesh(
            &vertices,
            &[SubmeshDesc {
                indices: &cube.indices,
                material: material.0,
            }],
        )?;

        let mut camera = Camera::look_at(Vec3::new(5.0, 4.0, 7.0), Vec3::new(0.0, 0.5, 0.0));
        camera.set_aspect(width as f32 / height.max(1) as f32);

        let light = MainLight {
            position: Vec3::new(8.0, 14.0, 6.0),
            ..MainLight::default()
        };

        let point_lights = vec![
            PointLight::new(Vec3::new(-3.0, 2.0, 2.0), Vec3::new(1.0, 0.4, 0.2)),
            PointLight::new(Vec3::new(3.0, 1.5, -2.0), Vec3::new(0.2, 0.4, 1.0)),
        ];

        let floor = Transform {
            translation: Vec3::new(0.0, -0.55, 0.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::new(12.0, 0.1, 12.0),
        };

        let renderables = vec![
            Renderable::new(mesh.0)
                .with_transform(floor)
                .with_tint(Vec4::new(0.8, 0.8, 0.8, 1.0)),
            Renderable::new(mesh.0)
                .with_transform(Transform::new().with_translation(Vec3::new(0.0, 0.5, 0.0))),
            Renderable::new(mesh.0)
                .with_transform(
                    Transform::new()
                        .with_translation(Vec3::new(-2.5, 0.25, 1.0))
                        .with_scale(0.5),
                )
                .with_tint(Vec4::new(1.0, 0.6, 0.4, 1.0)),
            Renderable::new(mesh.0)
                .with_transform(
                    Transform::new()
                        .with_translation(Vec3::new(2.0, 0.35, -1.5))
                        .with_scale(0.7),
                )
                .with_tint(Vec4::new(0.5, 0.8, 1.0, 1.0)),
        ];

        Ok(Self {
            camera,
            light,
            point_lights,
            renderables,
        })
    }

    /// Spins the non-floor cubes around Y.
    fn animate(&mut self, elapsed_secs: f32) {
        for (i, renderable) in self.renderables.iter_mut().skip(1).enumerate() {
            let speed = 0.6 + i as f32 * 0.3;
            renderable.transform.rotation = Quat::from_rotation_y(elapsed_secs * speed);
        }
    }
}

struct App {
    config: RendererConfig,
    window: Option<Window>,
    renderer: Option<Renderer>,
    scene: Option<DemoScene>,
    timer: Timer,
}

impl App {
    fn new(config: RendererConfig) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            scene: None,
            timer: Timer::new(),
        }
    }

    /// Records and submits one frame; a stale swapchain skips the frame.
    fn render_frame(&mut self) -> Result<()> {
        let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) else {
            return Ok(());
        };

        scene.animate(self.timer.elapsed_secs());

        let status = renderer.begin_frame(&scene.camera, &scene.light, &scene.point_lights)?;
        if status == FrameStatus::SwapchainStale {
            scene.camera.set_aspect(renderer.aspect_ratio());
            return Ok(());
        }

        renderer.begin_shadow_pass();
        for r in &scene.renderables {
            renderer.draw_tinted(MeshHandle(r.mesh), 0, r.transform.matrix(), r.tint)?;
        }
        renderer.end_pass();

        renderer.begin_main_pass();
        for r in &scene.renderables {
            renderer.draw_tinted(MeshHandle(r.mesh), 0, r.transform.matrix(), r.tint)?;
        }
        renderer.end_pass();

        renderer.submit_draws()?;
        if renderer.end_frame()? == FrameStatus::SwapchainStale {
            scene.camera.set_aspect(renderer.aspect_ratio());
        }

        Ok(())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match Window::new(
            event_loop,
            self.config.window_width,
            self.config.window_height,
            &self.config.window_title,
        ) {
            Ok(window) => window,
            Err(e) => {
                error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let mut renderer = match Renderer::new(&window, &self.config) {
            Ok(renderer) => renderer,
            Err(e) => {
                error!("Failed to create renderer: {:?}", e);
                event_loop.exit();
                return;
            }
        };

        match DemoScene::build(&mut renderer, window.width(), window.height()) {
            Ok(scene) => {
                info!("Initialization complete, entering main loop");
                self.scene = Some(scene);
                self.renderer = Some(renderer);
                self.window = Some(window);
                self.timer.reset();
            }
            Err(e) => {
                error!("Failed to build scene: {:?}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed()
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    info!("Escape pressed, shutting down");
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut window) = self.window {
                    window.resize(size.width, size.height);
                }
                if let Some(ref mut renderer) = self.renderer {
                    renderer.resize(size.width, size.height);
                }
                if let Some(ref mut scene) = self.scene {
                    scene
                        .camera
                        .set_aspect(size.width as f32 / size.height.max(1) as f32);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render_frame() {
                    error!("Render error: {:?}", e);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    glint_core::init_logging();
    info!("Starting glint");

    let config = RendererConfig::default();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
