use super::error::GraphicsError;
use super::texture::RenderTarget;

/// Bounded stack of off-screen targets. Empty means the backbuffer.
#[derive(Debug, Clone)]
pub struct TargetStack {
    targets: Vec<RenderTarget>,
    max_depth: usize,
}

impl TargetStack {
    pub fn new(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            targets: Vec::with_capacity(max_depth),
            max_depth,
        }
    }

    #[inline]
    pub fn current(&self) -> Option<&RenderTarget> {
        self.targets.last()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.targets.len()
    }

    pub fn push(&mut self, target: RenderTarget) -> Result<(), GraphicsError> {
        if self.targets.len() >= self.max_depth {
            return Err(GraphicsError::TargetOverflow {
                max: self.max_depth,
            });
        }
        self.targets.push(target);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<RenderTarget, GraphicsError> {
        self.targets.pop().ok_or(GraphicsError::TargetUnderflow)
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Whether `target` is anywhere on the stack.
    pub fn contains(&self, target: &RenderTarget) -> bool {
        self.targets.iter().any(|t| t.id() == target.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::gpu::TextureId;

    fn target(id: u32) -> RenderTarget {
        RenderTarget::new(TextureId::new(id), 32, 32)
    }

    #[test]
    fn empty_stack_is_backbuffer() {
        let mut s = TargetStack::new(2);
        assert!(s.current().is_none());
        assert_eq!(s.pop(), Err(GraphicsError::TargetUnderflow));
    }

    #[test]
    fn push_pop_pairs() {
        let mut s = TargetStack::new(2);
        s.push(target(1)).unwrap();
        s.push(target(2)).unwrap();
        assert_eq!(s.current().map(|t| t.id()), Some(TextureId::new(2)));
        assert_eq!(s.push(target(3)), Err(GraphicsError::TargetOverflow { max: 2 }));

        assert_eq!(s.pop().unwrap().id(), TextureId::new(2));
        assert!(s.contains(&target(1)));
        assert!(!s.contains(&target(2)));
    }
}
