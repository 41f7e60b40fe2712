/// Row-major RGBA8 cloud layer, straight alpha. Allocated on resize and
/// otherwise overwritten in place every frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CloudField {
    pub rgba: Vec<u8>,
    pub w: usize,
    pub h: usize,
}

pub const CHANNELS: usize = 4;

impl CloudField {
    pub fn new(w: usize, h: usize) -> Self {
        let mut field = Self::default();
        field.resize(w, h);
        field
    }

    /// Returns true if the buffer was reallocated. Same dimensions are a no-op.
    pub fn resize(&mut self, w: usize, h: usize) -> bool {
        if self.w == w && self.h == h && self.rgba.len() == w * h * CHANNELS {
            return false;
        }
        self.w = w;
        self.h = h;
        self.rgba = vec![0u8; w * h * CHANNELS];
        true
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rgba.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        (y * self.w + x) * CHANNELS
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 4] {
        let i = self.idx(x, y);
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }

    #[inline]
    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        self.rgba[self.idx(x, y) + 3]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.rgba
    }
}
