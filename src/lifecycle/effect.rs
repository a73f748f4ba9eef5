//! Dependency-Gated Effect Guard
//!
//! [`DepEffect`] remembers the dependency value an effect last ran with and
//! reports whether a new value differs, so expensive side effects (tearing
//! down and rebuilding manipulators, recomputing viewports) run only when
//! their inputs actually change — compared structurally, not by reference,
//! to avoid needless rebuilds on every pass.

/// Tracks the last dependencies an effect ran with.
#[derive(Debug, Default)]
pub struct DepEffect<T: PartialEq> {
    deps: Option<T>,
}

impl<T: PartialEq> DepEffect<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { deps: None }
    }

    /// Returns `true` (and records `next`) when the dependencies changed
    /// since the last run. The first call always reports a change.
    pub fn changed(&mut self, next: T) -> bool {
        if self.deps.as_ref() == Some(&next) {
            return false;
        }
        self.deps = Some(next);
        true
    }

    /// Like [`changed`](Self::changed) with a custom equality predicate.
    pub fn changed_by(&mut self, next: T, eq: impl Fn(&T, &T) -> bool) -> bool {
        if let Some(prev) = &self.deps
            && eq(prev, &next)
        {
            return false;
        }
        self.deps = Some(next);
        true
    }

    /// Forgets the recorded dependencies; the next call reports a change.
    pub fn reset(&mut self) {
        self.deps = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_always_fires() {
        let mut effect = DepEffect::new();
        assert!(effect.changed(vec![1, 2, 3]));
    }

    #[test]
    fn equal_deps_do_not_fire() {
        let mut effect = DepEffect::new();
        assert!(effect.changed(vec![1, 2, 3]));
        assert!(!effect.changed(vec![1, 2, 3]));
        assert!(effect.changed(vec![1, 2]));
    }

    #[test]
    fn custom_equality() {
        let mut effect = DepEffect::new();
        // Compare only the integer part.
        let eq = |a: &f64, b: &f64| a.trunc() == b.trunc();
        assert!(effect.changed_by(1.2, eq));
        assert!(!effect.changed_by(1.9, eq));
        assert!(effect.changed_by(2.0, eq));
    }

    #[test]
    fn reset_rearms() {
        let mut effect = DepEffect::new();
        assert!(effect.changed(7));
        effect.reset();
        assert!(effect.changed(7));
    }
}
