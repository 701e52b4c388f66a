/// Render layer: controls compositing order and which target receives geometry.
///
/// Ground is flushed into the persistent ground surface, Render is drawn into
/// the main scene, Bloom is optionally blended on top of it.
/// Default layer is `Render`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum RenderLayer {
    Ground = 0,
    #[default]
    Render = 1,
    Bloom = 2,
}

impl RenderLayer {
    /// Total number of render layers.
    pub const COUNT: usize = 3;

    /// All layers in compositing order.
    pub const ALL: [RenderLayer; Self::COUNT] = [Self::Ground, Self::Render, Self::Bloom];

    /// Convert from a u8 value to a RenderLayer.
    /// Returns None if the value is out of range.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ground),
            1 => Some(Self::Render),
            2 => Some(Self::Bloom),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Index into per-layer storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether `clear()` empties this layer's batches at the start of a frame.
    /// Ground batches are drained by the ground flush instead.
    pub fn is_frame_transient(self) -> bool {
        !matches!(self, Self::Ground)
    }
}
