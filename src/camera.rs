use glam::Mat4;

/// Orthographic camera shared by the feedback and composite passes.
///
/// Frames exactly the `[-1, 1] x [-1, 1]` quad both passes draw, with no
/// perspective, so every fragment of a target is covered once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoCamera {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for OrthoCamera {
    fn default() -> Self {
        Self {
            left: -1.0,
            right: 1.0,
            bottom: -1.0,
            top: 1.0,
            near: 0.0,
            far: 1.0,
        }
    }
}

impl OrthoCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Combined view-projection matrix (the view is the identity).
    pub fn view_proj(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}
