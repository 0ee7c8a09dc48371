//! Headless rasterizer for previewing a frame as a PNG.
//!
//! This is not the production renderer; it gives a quick look at a field
//! without a GPU host. Nodes, synapses and pulses are projected through a
//! perspective camera and blended additively onto a black background, using
//! the crimson palette of the dashboard background.

use crate::appearance::smoothstep;
use crate::error::SnapshotError;
use crate::frame::{Buffer, Frame};
use crate::transform::FieldTransform;
use glam::{Mat4, Vec2, Vec3, Vec4};
use image::{Rgba, RgbaImage};
use std::path::Path;

const NODE_DEEP: Vec3 = Vec3::new(0.85, 0.12, 0.1);
const NODE_BRIGHT: Vec3 = Vec3::new(1.0, 0.25, 0.15);
const HUB_CORE: Vec3 = Vec3::new(1.0, 0.85, 0.8);
const SYNAPSE: Vec3 = Vec3::new(0.7, 0.1, 0.08);
const PULSE_EDGE: Vec3 = Vec3::new(0.9, 0.2, 0.15);
const PULSE_CORE: Vec3 = Vec3::new(1.0, 0.95, 0.9);

/// Nodes at or above this rendered size get a white-hot core.
const HUB_CORE_SIZE: f32 = 6.0;
/// Synapse lines are drawn at this fraction of their opacity.
const SYNAPSE_STRENGTH: f32 = 0.35;
/// Points closer to the camera than this are culled.
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Largest image, in pixels, a snapshot may allocate.
pub const MAX_PIXELS: u64 = 1 << 26;

/// Camera and image settings for a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotOptions {
    pub width: u32,
    pub height: u32,
    /// Camera distance from the field centre along +Z.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Point size scale for nodes, in pixels per unit size at unit depth.
    pub node_scale: f32,
    /// Point size scale for pulses.
    pub pulse_scale: f32,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            camera_distance: 8.0,
            fov_degrees: 75.0,
            node_scale: 300.0,
            pulse_scale: 250.0,
        }
    }
}

impl SnapshotOptions {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// Additive float accumulation buffer.
struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Vec3>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    #[inline]
    fn add(&mut self, x: i32, y: i32, color: Vec3, alpha: f32) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels[idx] += color * alpha;
    }

    fn line(&mut self, a: Vec2, b: Vec2, color: Vec3, alpha: f32) {
        let Some((a, b)) = self.clip(a, b) else {
            return;
        };
        let delta = b - a;
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as i32;
        for s in 0..=steps {
            let p = a + delta * (s as f32 / steps as f32);
            self.add(p.x.round() as i32, p.y.round() as i32, color, alpha);
        }
    }

    /// Liang-Barsky clip of the segment `a..b` to the pixel rectangle.
    fn clip(&self, a: Vec2, b: Vec2) -> Option<(Vec2, Vec2)> {
        if !a.is_finite() || !b.is_finite() {
            return None;
        }
        let max = Vec2::new(self.width as f32 - 1.0, self.height as f32 - 1.0);
        let delta = b - a;
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        let edges = [
            (-delta.x, a.x),
            (delta.x, max.x - a.x),
            (-delta.y, a.y),
            (delta.y, max.y - a.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
            if t0 > t1 {
                return None;
            }
        }
        Some((a + delta * t0, a + delta * t1))
    }

    /// Soft round sprite: radial glow plus a tighter core tinted `core_color`.
    fn splat(
        &mut self,
        center: Vec2,
        radius: f32,
        edge: Vec3,
        core_color: Vec3,
        core_width: f32,
        alpha: f32,
    ) {
        let radius = radius.max(0.5);
        let x0 = ((center.x - radius).floor() as i32).max(0);
        let x1 = ((center.x + radius).ceil() as i32).min(self.width as i32 - 1);
        let y0 = ((center.y - radius).floor() as i32).max(0);
        let y1 = ((center.y + radius).ceil() as i32).min(self.height as i32 - 1);
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vec2::new(x as f32, y as f32).distance(center) / radius;
                if d > 1.0 {
                    continue;
                }
                let glow = 1.0 - smoothstep(0.0, 1.0, d);
                let core = 1.0 - smoothstep(0.0, core_width, d);
                self.add(x, y, edge.lerp(core_color, core), glow * alpha);
            }
        }
    }

    fn into_image(self) -> RgbaImage {
        let width = self.width as usize;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let idx = y as usize * width + x as usize;
            let c = self.pixels[idx].clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
            Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
        })
    }
}

/// World-to-screen projection.
struct Projection {
    view_proj: Mat4,
    width: f32,
    height: f32,
}

impl Projection {
    fn new(transform: &FieldTransform, options: &SnapshotOptions) -> Self {
        let aspect = options.width as f32 / options.height as f32;
        let view = Mat4::look_at_rh(
            Vec3::new(0.0, 0.0, options.camera_distance),
            Vec3::ZERO,
            Vec3::Y,
        );
        let proj = Mat4::perspective_rh(
            options.fov_degrees.to_radians(),
            aspect,
            NEAR_PLANE,
            FAR_PLANE,
        );
        Self {
            view_proj: proj * view * transform.matrix(),
            width: options.width as f32,
            height: options.height as f32,
        }
    }

    /// Screen position and view depth, or `None` behind the near plane.
    fn project(&self, point: Vec3) -> Option<(Vec2, f32)> {
        let clip: Vec4 = self.view_proj * point.extend(1.0);
        if clip.w.is_nan() || clip.w < NEAR_PLANE {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let screen = Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (1.0 - ndc.y) * 0.5 * self.height,
        );
        Some((screen, clip.w))
    }
}

/// Rasterize `frame` as seen with the field oriented by `transform`.
pub fn render(
    frame: &Frame,
    transform: &FieldTransform,
    options: &SnapshotOptions,
) -> Result<RgbaImage, SnapshotError> {
    if options.width == 0 || options.height == 0 {
        return Err(SnapshotError::EmptyImage {
            width: options.width,
            height: options.height,
        });
    }
    if u64::from(options.width) * u64::from(options.height) > MAX_PIXELS {
        return Err(SnapshotError::TooLarge {
            width: options.width,
            height: options.height,
        });
    }

    let projection = Projection::new(transform, options);
    let mut canvas = Canvas::new(options.width, options.height);
    // Point sizes are authored for a 1000px-tall target.
    let pixel_scale = options.height as f32 / 1000.0;

    for i in 0..frame.connection_count() {
        let Some((start, end, opacity)) = frame.synapse(i) else {
            continue;
        };
        if let (Some((a, _)), Some((b, _))) = (projection.project(start), projection.project(end)) {
            canvas.line(a, b, SYNAPSE, opacity * SYNAPSE_STRENGTH);
        }
    }

    let sizes = frame.buffer(Buffer::NodeSizes);
    let alphas = frame.buffer(Buffer::NodeAlphas);
    for i in 0..frame.node_count() {
        let Some((screen, depth)) = projection.project(frame.node_position(i)) else {
            continue;
        };
        let size = sizes[i];
        let radius = size * options.node_scale / depth * pixel_scale * 0.5;
        let core_color = if size > HUB_CORE_SIZE {
            NODE_BRIGHT.lerp(HUB_CORE, 0.7)
        } else {
            NODE_BRIGHT
        };
        canvas.splat(screen, radius, NODE_DEEP, core_color, 0.3, alphas[i].clamp(0.0, 1.0));
    }

    let pulse_sizes = frame.buffer(Buffer::PulseSizes);
    for i in 0..frame.pulse_count() {
        let (position, alpha) = frame.pulse(i);
        if alpha <= 0.0 {
            continue;
        }
        let Some((screen, depth)) = projection.project(position) else {
            continue;
        };
        let radius = pulse_sizes[i] * options.pulse_scale / depth * pixel_scale * 0.5;
        canvas.splat(screen, radius, PULSE_EDGE, PULSE_CORE, 0.24, alpha);
    }

    Ok(canvas.into_image())
}

/// Render `frame` and write it to `path`. The format follows the extension.
pub fn save<P: AsRef<Path>>(
    frame: &Frame,
    transform: &FieldTransform,
    options: &SnapshotOptions,
    path: P,
) -> Result<(), SnapshotError> {
    let image = render(frame, transform, options)?;
    image.save(path.as_ref())?;
    tracing::debug!(path = %path.as_ref().display(), "snapshot written");
    Ok(())
}
