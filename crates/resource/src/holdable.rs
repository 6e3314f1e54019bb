use std::sync::atomic::{AtomicBool, Ordering};

/// A resource that a keeper can hold on behalf of a branch.
///
/// The keeper only reads and flips the held flag. It never looks further
/// into the resource.
pub trait Holdable: Send + Sync {
    fn is_held(&self) -> bool;

    fn set_held(&self, held: bool);
}

/// Held flag for embedding in a [`Holdable`] resource.
#[derive(Debug, Default)]
pub struct HeldFlag(AtomicBool);

impl HeldFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, held: bool) {
        self.0.store(held, Ordering::Release);
    }
}
