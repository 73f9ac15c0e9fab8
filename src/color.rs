/// RGBA color
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn as_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub(crate) fn as_f32(&self) -> [f32; 4] {
        [self.r as f32, self.g as f32, self.b as f32, self.a as f32]
    }

    /// Rounds and clamps a float color back to 8 bits per channel
    pub(crate) fn from_f32(c: &[f32; 4]) -> Self {
        let chan = |v: f32| v.round().clamp(0.0, 255.0) as u8;

        Self::new(chan(c[0]), chan(c[1]), chan(c[2]), chan(c[3]))
    }
}

impl From<[u8; 4]> for Color {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f32_rounds_and_clamps() {
        let c = Color::from_f32(&[-3.0, 127.5, 300.0, 254.4]);
        assert_eq!(c, Color::new(0, 128, 255, 254));
    }

    #[test]
    fn test_as_array() {
        assert_eq!(Color::from([1, 2, 3, 4]).as_array(), [1, 2, 3, 4]);
    }
}
