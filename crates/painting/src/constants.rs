/// Default brush diameter in buffer pixels.
pub const DEFAULT_BRUSH_SIZE: f32 = 10.0;

/// Smallest brush the toolbar offers.
pub const MIN_BRUSH_SIZE: f32 = 1.0;

/// Largest brush the toolbar offers.
pub const MAX_BRUSH_SIZE: f32 = 50.0;

/// Preview color for draw strokes (RGB).
pub const DRAW_PAINT_COLOR: [u8; 3] = [255, 255, 255];

/// Preview opacity for committed draw strokes. Purely visual.
pub const DRAW_PAINT_ALPHA: f32 = 0.7;

/// Extra alpha factor for live draw segments before the stroke is committed.
pub const LIVE_SEGMENT_ALPHA: f32 = 0.5;

/// A pixel counts as paint only above this alpha (0-255).
pub const MASK_ALPHA_THRESHOLD: u8 = 50;

/// ...and only if one color channel is above this (0-255).
pub const MASK_COLOR_THRESHOLD: u8 = 10;

/// Masked-in output pixel.
pub const MASK_WHITE: [u8; 4] = [255, 255, 255, 255];

/// Masked-out output pixel.
pub const MASK_BLACK: [u8; 4] = [0, 0, 0, 255];

/// Aspect ratios closer than this are treated as equal when resampling.
pub const ASPECT_EPSILON: f32 = 0.01;

/// Miter joins longer than this multiple of the line width fall back to bevel.
pub const MITER_LIMIT: f32 = 10.0;

/// Sub-samples per axis for anti-aliased coverage (4x4 = 16 bits).
pub const SUPERSAMPLE_GRID: u32 = 4;

/// Upper bound on surface size. Not a hard platform limit - may change.
pub const MAX_SURFACE_PIXELS: u64 = 16_384 * 16_384;

/// Pointer moves shorter than this are not recorded as new points.
pub const MIN_POINT_DISTANCE: f32 = 0.001;
