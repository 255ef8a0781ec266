use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::Vec3;
use winit::{keyboard::KeyCode, window::Window};

pub mod config;
pub mod error;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod shader;
#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{SceneError, TextureError};

use renderer::Renderer;
use scene::{Camera, FrameRecorder, SceneManager};

const CAMERA_START: Vec3 = Vec3::new(0.0, 24.0, 20.0);
const CAMERA_TARGET: Vec3 = Vec3::new(0.0, 15.0, -14.0);

pub struct State {
    window: Arc<Window>,
    camera: Camera,
    scene: SceneManager,
    frame: FrameRecorder,
    renderer: Renderer,
    last_update: Instant,
}

impl State {
    pub fn new(window: Window, config: &Config) -> Result<Self> {
        let window = Arc::new(window);
        let size = window.inner_size();

        let mut renderer = Renderer::new(window.clone())?;
        let mut scene = SceneManager::new(&config.texture_dir)
            .with_strict_textures(config.strict_textures);
        let mut frame = FrameRecorder::new();

        scene
            .prepare_scene(&mut frame, renderer.textures_mut())
            .with_context(|| format!("Failed to prepare scene from {}", config.texture_dir.display()))?;
        renderer.upload_meshes(scene.meshes());

        let aspect = size.width.max(1) as f32 / size.height.max(1) as f32;
        let camera = Camera::looking_at(CAMERA_START, CAMERA_TARGET, aspect);

        Ok(Self {
            window,
            camera,
            scene,
            frame,
            renderer,
            last_update: Instant::now(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    pub fn process_keyboard(&mut self, key: KeyCode, pressed: bool) {
        self.camera.process_keyboard(key, pressed);
    }

    pub fn process_mouse(&mut self, dx: f32, dy: f32) {
        self.camera.process_mouse(dx, dy);
    }

    pub fn process_scroll(&mut self, lines: f32) {
        self.camera.process_scroll(lines);
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f32();
        self.last_update = now;
        self.camera.update(dt);
    }

    pub fn render(&mut self) -> Result<()> {
        self.frame.begin_frame();
        self.scene.render_scene(&mut self.frame)?;

        match self
            .renderer
            .render(&self.frame, self.scene.meshes(), &self.camera)
        {
            Ok(()) => Ok(()),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost, reconfiguring");
                self.renderer.reconfigure();
                Ok(())
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                Ok(())
            }
            Err(e) => Err(e).context("Failed to render frame"),
        }
    }
}

impl Drop for State {
    fn drop(&mut self) {
        self.scene.release_textures(self.renderer.textures_mut());
    }
}
