//! Map lifecycle and view state
//!
//! A [`MapContainer`] is the mount point supplied by the host. Initializing a
//! surface on it yields a [`MapHandle`] that owns the view (center,
//! resolution, size) and the layer stack. The handle is consumed again by
//! [`MapSurface::dispose`], so a disposed map cannot be used.

use std::time::Duration;

use serde::Serialize;
use studymap_core::error::{Result, StudyMapError};
use studymap_core::models::{BackgroundLayer, Crs, Extent};
use uuid::Uuid;

use crate::layers::Layer;
use crate::overlay::OverlayLayer;

/// Host-supplied mount point for one map
#[derive(Debug, Clone)]
pub struct MapContainer {
    id: String,
    width_px: u32,
    height_px: u32,
    mounted: Option<Uuid>,
}

impl MapContainer {
    pub fn new(id: impl Into<String>, width_px: u32, height_px: u32) -> Self {
        Self { id: id.into(), width_px, height_px, mounted: None }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width_px, self.height_px)
    }

    /// Instance currently mounted here, if any
    pub fn mounted_instance(&self) -> Option<Uuid> {
        self.mounted
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }
}

/// Lower zoom bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MinZoom {
    Fixed(f64),
    /// `narrow` up to and including `breakpoint_px` of container width, `wide` above
    Responsive { breakpoint_px: u32, narrow: f64, wide: f64 },
}

impl MinZoom {
    pub fn resolve(&self, width_px: u32) -> f64 {
        match *self {
            MinZoom::Fixed(zoom) => zoom,
            MinZoom::Responsive { breakpoint_px, narrow, wide } => {
                if width_px <= breakpoint_px {
                    narrow
                } else {
                    wide
                }
            }
        }
    }

    /// Highest value `resolve` can return for any width
    pub fn upper_bound(&self) -> f64 {
        match *self {
            MinZoom::Fixed(zoom) => zoom,
            MinZoom::Responsive { narrow, wide, .. } => narrow.max(wide),
        }
    }
}

impl Default for MinZoom {
    fn default() -> Self {
        MinZoom::Responsive { breakpoint_px: 1080, narrow: 7.5, wide: 8.3 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    /// Display projection of the view
    pub projection: Crs,
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: MinZoom,
    pub max_zoom: f64,
    /// The visible area never leaves this extent
    pub extent: Extent,
    pub background: BackgroundLayer,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: Crs::web_mercator(),
            center: [919_705.979_78, 5_923_388.486_16],
            zoom: 1.0,
            min_zoom: MinZoom::default(),
            max_zoom: 20.0,
            extent: Extent::new(506_943.5, 5_652_213.5, 1_301_728.5, 6_191_092.0),
            background: BackgroundLayer::default(),
        }
    }
}

impl MapConfig {
    pub fn with_background(mut self, background: BackgroundLayer) -> Self {
        self.background = background;
        self
    }
}

/// Resolution at zoom 0 for a display projection
pub fn max_resolution(projection: &Crs) -> Result<f64> {
    match projection.epsg {
        3857 => Ok(156_543.033_928_040_97),
        2056 => Ok(1875.0),
        4326 => Ok(1.406_25),
        _ => Err(StudyMapError::UnsupportedProjection {
            from: projection.to_string(),
            to: "map view".to_string(),
        }),
    }
}

/// Snapshot of what the view shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub center: [f64; 2],
    pub resolution: f64,
    pub zoom: f64,
    pub projection: Crs,
    pub size: (u32, u32),
    pub background: BackgroundLayer,
    /// Bumped whenever the layer stack changes
    pub revision: u64,
}

/// Options for [`MapHandle::fit_to_extent`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// top, right, bottom, left in pixels
    pub padding: [f64; 4],
    pub duration: Option<Duration>,
}

impl FitOptions {
    pub fn padding(px: f64) -> Self {
        Self { padding: [px; 4], duration: None }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

#[derive(Debug, Clone)]
struct ViewAnimation {
    from_center: [f64; 2],
    from_resolution: f64,
    to_center: [f64; 2],
    to_resolution: f64,
    duration: Duration,
    elapsed: Duration,
}

/// 3t² - 2t³
fn ease_in_out(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

pub struct MapSurface;

impl MapSurface {
    /// Create the map instance for `container`
    pub fn initialize(container: &mut MapContainer, config: MapConfig) -> Result<MapHandle> {
        if container.is_mounted() {
            return Err(StudyMapError::SurfaceAlreadyMounted { container: container.id.clone() });
        }
        if config.extent.is_empty() {
            return Err(StudyMapError::InvalidExtent {
                reason: "map extent must not be empty".to_string(),
            });
        }
        let min_zoom = config.min_zoom.upper_bound();
        if !min_zoom.is_finite() || !config.max_zoom.is_finite() || min_zoom > config.max_zoom {
            return Err(StudyMapError::ConfigInvalid {
                key: "min_zoom".to_string(),
                reason: format!("{} exceeds max zoom {}", min_zoom, config.max_zoom),
            });
        }
        let zoom0_resolution = max_resolution(&config.projection)?;

        let instance = Uuid::new_v4();
        let size = container.size();
        let mut handle = MapHandle {
            instance,
            container_id: container.id.clone(),
            size,
            center: config.center,
            resolution: zoom0_resolution / 2f64.powf(config.zoom),
            max_resolution: zoom0_resolution,
            layers: vec![Layer::background(config.background)],
            animation: None,
            revision: 0,
            config,
        };
        handle.constrain();
        container.mounted = Some(instance);

        tracing::info!(
            container = %container.id,
            instance = %instance,
            zoom = handle.zoom(),
            "Map initialized"
        );
        Ok(handle)
    }

    /// Tear the map down and free its container
    pub fn dispose(container: &mut MapContainer, handle: MapHandle) -> Result<()> {
        if container.mounted != Some(handle.instance) {
            return Err(StudyMapError::SurfaceNotMounted { container: container.id.clone() });
        }
        container.mounted = None;
        tracing::info!(container = %container.id, instance = %handle.instance, "Map disposed");
        Ok(())
    }
}

/// A live map instance
#[derive(Debug)]
pub struct MapHandle {
    instance: Uuid,
    container_id: String,
    config: MapConfig,
    size: (u32, u32),
    center: [f64; 2],
    resolution: f64,
    max_resolution: f64,
    layers: Vec<Layer>,
    animation: Option<ViewAnimation>,
    revision: u64,
}

impl MapHandle {
    pub fn instance_id(&self) -> Uuid {
        self.instance
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn projection(&self) -> &Crs {
        &self.config.projection
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn zoom(&self) -> f64 {
        (self.max_resolution / self.resolution).log2()
    }

    pub fn min_zoom(&self) -> f64 {
        self.config.min_zoom.resolve(self.size.0)
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            center: self.center,
            resolution: self.resolution,
            zoom: self.zoom(),
            projection: self.config.projection.clone(),
            size: self.size,
            background: self.background(),
            revision: self.revision,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn background(&self) -> BackgroundLayer {
        match self.layers.first() {
            Some(Layer::Background { layer, .. }) => *layer,
            _ => self.config.background,
        }
    }

    /// Swap the background in place; overlays keep their position
    pub fn set_background_layer(&mut self, background: BackgroundLayer) {
        let layer = Layer::background(background);
        if matches!(self.layers.first(), Some(Layer::Background { .. })) {
            self.layers[0] = layer;
        } else {
            self.layers.insert(0, layer);
        }
        self.revision += 1;
        tracing::debug!(background = %background, "Background layer changed");
    }

    pub fn overlays(&self) -> impl Iterator<Item = &OverlayLayer> {
        self.layers.iter().filter_map(Layer::as_overlay)
    }

    pub(crate) fn overlays_mut(&mut self) -> impl Iterator<Item = &mut OverlayLayer> {
        self.layers.iter_mut().filter_map(Layer::as_overlay_mut)
    }

    /// Drop every layer above the background
    pub(crate) fn clear_overlays(&mut self) {
        self.layers.retain(|layer| matches!(layer, Layer::Background { .. }));
        self.revision += 1;
    }

    pub(crate) fn push_overlay(&mut self, overlay: OverlayLayer) {
        self.layers.push(Layer::Overlay(overlay));
        self.revision += 1;
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }

    /// Fit the view to `extent`, immediately or as an animation
    pub fn fit_to_extent(&mut self, extent: Extent, options: FitOptions) -> Result<()> {
        if extent.is_empty() {
            return Err(StudyMapError::InvalidExtent {
                reason: "cannot fit the view to an empty extent".to_string(),
            });
        }
        let [top, right, bottom, left] = options.padding;
        let (width, height) = (self.size.0 as f64, self.size.1 as f64);
        let available_w = (width - left - right).max(1.0);
        let available_h = (height - top - bottom).max(1.0);

        let resolution =
            self.clamp_resolution((extent.width() / available_w).max(extent.height() / available_h));

        let [cx, cy] = extent.center().unwrap_or(self.center);
        let center = self.constrain_center(
            [cx + (right - left) / 2.0 * resolution, cy + (top - bottom) / 2.0 * resolution],
            resolution,
        );

        match options.duration {
            Some(duration) if !duration.is_zero() => {
                self.animation = Some(ViewAnimation {
                    from_center: self.center,
                    from_resolution: self.resolution,
                    to_center: center,
                    to_resolution: resolution,
                    duration,
                    elapsed: Duration::ZERO,
                });
            }
            _ => {
                self.animation = None;
                self.center = center;
                self.resolution = resolution;
            }
        }
        tracing::debug!(?center, resolution, animated = self.animation.is_some(), "Fit view to extent");
        Ok(())
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance a running animation; returns whether it is still running
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        animation.elapsed += elapsed;

        let t = (animation.elapsed.as_secs_f64() / animation.duration.as_secs_f64()).min(1.0);
        let k = ease_in_out(t);
        let lerp = |a: f64, b: f64| a + (b - a) * k;

        self.center = [
            lerp(animation.from_center[0], animation.to_center[0]),
            lerp(animation.from_center[1], animation.to_center[1]),
        ];
        self.resolution = lerp(animation.from_resolution, animation.to_resolution);

        if t >= 1.0 {
            self.center = animation.to_center;
            self.resolution = animation.to_resolution;
            self.animation = None;
        }
        self.animation.is_some()
    }

    /// Map coordinate under a container pixel
    pub fn coordinate_from_pixel(&self, pixel: [f64; 2]) -> [f64; 2] {
        let (width, height) = (self.size.0 as f64, self.size.1 as f64);
        [
            self.center[0] + (pixel[0] - width / 2.0) * self.resolution,
            self.center[1] - (pixel[1] - height / 2.0) * self.resolution,
        ]
    }

    /// Container pixel of a map coordinate
    pub fn pixel_from_coordinate(&self, coord: [f64; 2]) -> [f64; 2] {
        let (width, height) = (self.size.0 as f64, self.size.1 as f64);
        [
            (coord[0] - self.center[0]) / self.resolution + width / 2.0,
            (self.center[1] - coord[1]) / self.resolution + height / 2.0,
        ]
    }

    /// Container size changed; re-applies the responsive zoom bound
    pub fn resize(&mut self, width_px: u32, height_px: u32) {
        self.size = (width_px, height_px);
        self.constrain();
    }

    /// Drag gesture
    pub fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        self.animation = None;
        self.center = [self.center[0] - dx * self.resolution, self.center[1] + dy * self.resolution];
        self.constrain();
    }

    /// Wheel or button zoom; positive zooms in
    pub fn zoom_by(&mut self, delta: f64) {
        self.animation = None;
        self.resolution /= 2f64.powf(delta);
        self.constrain();
    }

    fn clamp_resolution(&self, resolution: f64) -> f64 {
        let min_resolution = self.max_resolution / 2f64.powf(self.config.max_zoom);
        let max_resolution = self.max_resolution / 2f64.powf(self.min_zoom());
        resolution.clamp(min_resolution, max_resolution)
    }

    fn constrain_center(&self, center: [f64; 2], resolution: f64) -> [f64; 2] {
        let extent = &self.config.extent;
        let half_w = self.size.0 as f64 * resolution / 2.0;
        let half_h = self.size.1 as f64 * resolution / 2.0;

        let axis = |value: f64, min: f64, max: f64, half: f64| {
            if max - min <= 2.0 * half {
                (min + max) / 2.0
            } else {
                value.clamp(min + half, max - half)
            }
        };
        [
            axis(center[0], extent.min_x, extent.max_x, half_w),
            axis(center[1], extent.min_y, extent.max_y, half_h),
        ]
    }

    fn constrain(&mut self) {
        self.resolution = self.clamp_resolution(self.resolution);
        self.center = self.constrain_center(self.center, self.resolution);
    }
}
