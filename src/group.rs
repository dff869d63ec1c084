//! Strided read-only views over grouped per-ray buffers.
//!
//! Several buffers store more than one entry per ray: the candidate group, the
//! canonical (entry, exit) pair, historical point groups. Entry `k` of ray `i`
//! lives at `i * group_size + k`.

/// Read-only view of a flat buffer holding `group_size` entries per ray.
#[derive(Debug, Clone, Copy)]
pub struct GroupView<'a, T> {
    data: &'a [T],
    group_size: usize,
}

impl<'a, T> GroupView<'a, T> {
    /// Wrap `data` with the given stride.
    ///
    /// # Panics
    ///
    /// Panics if `group_size` is zero.
    pub fn new(data: &'a [T], group_size: usize) -> Self {
        assert!(group_size > 0, "group size must be positive");
        Self { data, group_size }
    }

    /// Entries per ray.
    pub fn group_size(&self) -> usize {
        self.group_size
    }

    /// Number of complete groups in the buffer.
    pub fn rays(&self) -> usize {
        self.data.len() / self.group_size
    }

    /// All entries of ray `i`.
    pub fn group(&self, i: usize) -> &'a [T] {
        let start = i * self.group_size;
        &self.data[start..start + self.group_size]
    }

    /// First entry of ray `i`.
    pub fn first(&self, i: usize) -> &'a T {
        &self.data[i * self.group_size]
    }
}
