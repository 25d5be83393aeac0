/// xorshift32. Small, fast and deterministic for a given seed.
#[derive(Clone, Debug)]
pub struct Rng(u32);

impl Rng {
    pub const fn new(seed: u32) -> Self {
        // An all-zero state never leaves zero.
        Self(if seed == 0 { 0x9E37_79B9 } else { seed })
    }

    pub fn next(&mut self) -> u32 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 17;
        self.0 ^= self.0 << 5;
        self.0
    }

    /// Uniform-ish value in `0..max`. `max` must be non-zero.
    pub fn range(&mut self, max: u32) -> u32 {
        self.next() % max
    }

    pub fn coin(&mut self) -> bool {
        self.next() & 1 == 1
    }

    /// In-place Fisher–Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}
