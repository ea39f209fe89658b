//! Fixed-capacity vertex/index storage shared by both batches.

use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

use super::gpu::{BufferId, BufferKind, GpuContext};

/// Primitive shape a batch accumulates.
pub(crate) trait Primitive {
    const NAME: &'static str;
    const VERTICES: usize;
    /// Index pattern of one primitive, relative to its first vertex.
    const INDICES: &'static [u32];
}

pub(crate) struct Triangle;

impl Primitive for Triangle {
    const NAME: &'static str = "triangle";
    const VERTICES: usize = 3;
    const INDICES: &'static [u32] = &[0, 1, 2];
}

pub(crate) struct Quad;

impl Primitive for Quad {
    const NAME: &'static str = "quad";
    const VERTICES: usize = 4;
    const INDICES: &'static [u32] = &[0, 1, 2, 0, 2, 3];
}

/// CPU-side vertex storage plus the GPU buffers it is uploaded into.
///
/// Invariants:
/// - vertex storage is allocated once (`capacity * P::VERTICES`) and never resized
/// - `cursor` counts primitives, never exceeds `capacity`
/// - the index pattern is generated once; it is uploaded on the first submit
pub(crate) struct BatchBuffer<V, P> {
    vertices: Vec<V>,
    indices: Vec<u32>,
    capacity: usize,
    cursor: usize,

    vertex_buffer: BufferId,
    index_buffer: BufferId,
    indices_uploaded: bool,

    submits: u32,
    submitted_primitives: u32,

    _primitive: PhantomData<P>,
}

impl<V: Pod, P: Primitive> BatchBuffer<V, P> {
    pub fn new<G: GpuContext + ?Sized>(gpu: &mut G, capacity: usize, label: &str) -> Self {
        let capacity = capacity.max(1);
        let vertex_count = capacity * P::VERTICES;

        let indices: Vec<u32> = (0..capacity)
            .flat_map(|prim| {
                let base = (prim * P::VERTICES) as u32;
                P::INDICES.iter().map(move |i| base + i)
            })
            .collect();

        let vertex_buffer = gpu.create_buffer(
            BufferKind::Vertex,
            (vertex_count * std::mem::size_of::<V>()) as u64,
            &format!("{label} vbo"),
        );
        let index_buffer = gpu.create_buffer(
            BufferKind::Index,
            (indices.len() * std::mem::size_of::<u32>()) as u64,
            &format!("{label} ibo"),
        );

        Self {
            vertices: vec![<V as Zeroable>::zeroed(); vertex_count],
            indices,
            capacity,
            cursor: 0,
            vertex_buffer,
            index_buffer,
            indices_uploaded: false,
            submits: 0,
            submitted_primitives: 0,
            _primitive: PhantomData,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of primitives written since the last submit.
    #[inline]
    pub fn pending(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.cursor >= self.capacity
    }

    /// Vertices written since the last submit.
    #[inline]
    pub fn pending_vertices(&self) -> &[V] {
        &self.vertices[..self.cursor * P::VERTICES]
    }

    /// Writes one primitive at the cursor.
    ///
    /// The caller must submit first when the buffer is full.
    pub fn push(&mut self, primitive: &[V]) {
        debug_assert_eq!(primitive.len(), P::VERTICES, "wrong vertex count for {}", P::NAME);
        debug_assert!(!self.is_full(), "push into a full {} buffer", P::NAME);

        let start = self.cursor * P::VERTICES;
        self.vertices[start..start + P::VERTICES].copy_from_slice(primitive);
        self.cursor += 1;
    }

    /// Uploads pending vertices and issues one indexed draw.
    ///
    /// Returns the number of primitives drawn, `0` (and no GPU traffic) when
    /// nothing was pending. The caller binds shader/texture state beforehand.
    pub fn submit<G: GpuContext + ?Sized>(&mut self, gpu: &mut G) -> usize {
        if self.cursor == 0 {
            return 0;
        }

        if !self.indices_uploaded {
            gpu.write_buffer(self.index_buffer, bytemuck::cast_slice(&self.indices));
            self.indices_uploaded = true;
        }

        let drawn = self.cursor;
        gpu.write_buffer(self.vertex_buffer, bytemuck::cast_slice(self.pending_vertices()));
        gpu.draw_indexed(
            self.vertex_buffer,
            self.index_buffer,
            (drawn * P::INDICES.len()) as u32,
        );

        log::trace!("flushed {drawn} {}(s)", P::NAME);

        self.submits += 1;
        self.submitted_primitives += drawn as u32;
        self.cursor = 0;
        drawn
    }

    /// Drops pending primitives without drawing them. Returns how many were dropped.
    pub fn discard(&mut self) -> usize {
        std::mem::take(&mut self.cursor)
    }

    /// `(submits, primitives)` since the last [`reset_stats`](Self::reset_stats).
    #[inline]
    pub fn stats(&self) -> (u32, u32) {
        (self.submits, self.submitted_primitives)
    }

    pub fn reset_stats(&mut self) {
        self.submits = 0;
        self.submitted_primitives = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::testing::RecordingGpu;
    use crate::render::vertex::ShapeVertex;

    fn vertex(x: f32) -> ShapeVertex {
        ShapeVertex {
            position: [x, 0.0, 0.0],
            color: [1.0; 4],
        }
    }

    #[test]
    fn quad_indices_repeat_fan_pattern() {
        let mut gpu = RecordingGpu::new(10, 10);
        let buf: BatchBuffer<ShapeVertex, Quad> = BatchBuffer::new(&mut gpu, 2, "test");
        assert_eq!(buf.indices, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
        assert_eq!(buf.vertices.len(), 8);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut gpu = RecordingGpu::new(10, 10);
        let buf: BatchBuffer<ShapeVertex, Triangle> = BatchBuffer::new(&mut gpu, 0, "test");
        assert_eq!(buf.capacity(), 1);
    }

    #[test]
    fn submit_uploads_only_pending_vertices() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut buf: BatchBuffer<ShapeVertex, Triangle> = BatchBuffer::new(&mut gpu, 4, "test");
        buf.push(&[vertex(1.0), vertex(2.0), vertex(3.0)]);

        assert_eq!(buf.submit(&mut gpu), 1);
        assert!(buf.is_empty());

        let draws = gpu.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].index_count, 3);
        assert_eq!(draws[0].vertices.len(), 3 * ShapeVertex::STRIDE);
        assert_eq!(draws[0].vertices[0], 1.0);
        assert_eq!(draws[0].vertices[7], 2.0);
    }

    #[test]
    fn submit_when_empty_is_a_no_op() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut buf: BatchBuffer<ShapeVertex, Triangle> = BatchBuffer::new(&mut gpu, 4, "test");
        assert_eq!(buf.submit(&mut gpu), 0);
        assert!(gpu.draws().is_empty());
        assert_eq!(buf.stats(), (0, 0));
    }

    #[test]
    fn indices_upload_once() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut buf: BatchBuffer<ShapeVertex, Triangle> = BatchBuffer::new(&mut gpu, 4, "test");
        for _ in 0..3 {
            buf.push(&[vertex(0.0), vertex(0.0), vertex(0.0)]);
            buf.submit(&mut gpu);
        }
        assert_eq!(gpu.index_uploads(), 1);
        assert_eq!(buf.stats(), (3, 3));
    }

    #[test]
    fn discard_reports_dropped_primitives() {
        let mut gpu = RecordingGpu::new(10, 10);
        let mut buf: BatchBuffer<ShapeVertex, Triangle> = BatchBuffer::new(&mut gpu, 4, "test");
        buf.push(&[vertex(0.0), vertex(0.0), vertex(0.0)]);
        buf.push(&[vertex(0.0), vertex(0.0), vertex(0.0)]);
        assert_eq!(buf.discard(), 2);
        assert!(buf.is_empty());
    }
}
