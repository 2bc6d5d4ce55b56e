use pennant::{
    Dimension, FlagConfig, FlagSimulation, GridGeometry, Orientation, Vec3,
};
use wasm_bindgen::prelude::*;

// ---- Flag Demo ----

#[wasm_bindgen]
pub struct FlagDemo {
    flag: FlagSimulation<f32>,
    geometry: GridGeometry<f32>,
    vertices: Vec<f32>,
}

impl FlagDemo {
    fn from_flag(flag: FlagSimulation<f32>) -> Self {
        let geometry = flag.geometry();
        let vertices = vec![0.0; flag.cloth().particle_count() * 3];
        let mut demo = FlagDemo { flag, geometry, vertices };
        demo.refresh();
        demo
    }

    fn refresh(&mut self) {
        let rendered = self.flag.render(&mut self.vertices);
        debug_assert!(rendered.is_ok(), "vertex buffer out of sync: {:?}", rendered);
    }
}

#[wasm_bindgen]
impl FlagDemo {
    /// Flag of `width` x `height` metres hoisted on the left, or from the
    /// top when `vertical` is set.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, rest_distance: f32, vertical: bool) -> Self {
        let config = FlagConfig {
            width: Dimension::from_value(width as f64),
            height: Dimension::from_value(height as f64),
            rest_distance: rest_distance as f64,
            orientation: if vertical { Orientation::Vertical } else { Orientation::Horizontal },
            ..FlagConfig::default()
        };
        FlagDemo::from_flag(FlagSimulation::from_config(&config, None))
    }

    /// Build from host settings JSON, sized to a picture of
    /// `image_width` x `image_height` pixels.
    pub fn from_json(settings: &str, image_width: u32, image_height: u32) -> Result<FlagDemo, JsValue> {
        let config: FlagConfig = serde_json::from_str(settings)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let asset = pennant::AssetSize::new(image_width, image_height);
        Ok(FlagDemo::from_flag(FlagSimulation::from_config(&config, Some(asset))))
    }

    pub fn update(&mut self, dt: f32) {
        self.flag.simulate(dt);
        self.refresh();
    }

    pub fn set_wind(&mut self, x: f32, y: f32, z: f32) {
        self.flag.set_wind(Vec3::new(x, y, z));
    }

    pub fn set_vertical(&mut self, vertical: bool) {
        let orientation = if vertical { Orientation::Vertical } else { Orientation::Horizontal };
        self.flag.set_orientation(orientation);
        self.geometry = self.flag.geometry();
    }

    pub fn reset(&mut self) {
        self.flag.reset();
        self.refresh();
    }

    /// Returns flat [x0, y0, z0, x1, ...] in row-major order
    pub fn positions(&self) -> Vec<f32> {
        self.vertices.clone()
    }

    /// Three indices per triangle
    pub fn indices(&self) -> Vec<u32> {
        self.geometry.indices.clone()
    }

    /// Returns flat [u0, v0, u1, v1, ...]
    pub fn uvs(&self) -> Vec<f32> {
        self.geometry.uv_buffer()
    }

    pub fn particle_count(&self) -> usize {
        self.flag.cloth().particle_count()
    }

    pub fn cols(&self) -> usize {
        self.flag.cloth().columns()
    }

    pub fn rows(&self) -> usize {
        self.flag.cloth().rows()
    }
}
