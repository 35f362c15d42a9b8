//! Heading identifier registry.

use std::collections::HashMap;

/// Keeps heading ids unique within one render session.
///
/// Each registered id maps to the last suffix handed out for it. The table
/// only grows until [`HeadingIdRegistry::clear`] is called.
#[derive(Debug, Default)]
pub struct HeadingIdRegistry {
    ids: HashMap<String, usize>,
}

impl HeadingIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `candidate` if unseen, otherwise a suffixed variant.
    ///
    /// A repeated candidate first tries `{candidate}-{count + 1}`. If that
    /// probe is taken as well, the answer is `{candidate}-1` without further
    /// probing, which can collide with an existing id on contrived input.
    pub fn ensure_unique(&mut self, candidate: &str) -> String {
        let id = match self.ids.get(candidate).copied() {
            None => candidate.to_string(),
            Some(count) => {
                let probe = format!("{}-{}", candidate, count + 1);
                if self.ids.contains_key(&probe) {
                    tracing::debug!(candidate, probe = %probe, "heading id probe taken, falling back to -1 suffix");
                    format!("{}-1", candidate)
                } else {
                    self.ids.insert(candidate.to_string(), count + 1);
                    probe
                }
            }
        };

        self.ids.entry(id.clone()).or_insert(0);
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_first_use_is_unchanged() {
        let mut ids = HeadingIdRegistry::new();
        assert_eq!(ids.ensure_unique("intro"), "intro");
        assert_eq!(ids.ensure_unique("usage"), "usage");
    }

    #[test]
    fn test_repeats_count_up() {
        let mut ids = HeadingIdRegistry::new();
        assert_eq!(ids.ensure_unique("intro"), "intro");
        assert_eq!(ids.ensure_unique("intro"), "intro-1");
        assert_eq!(ids.ensure_unique("intro"), "intro-2");
        assert_eq!(ids.ensure_unique("intro-1"), "intro-1-1");
    }

    #[test]
    fn test_taken_probe_falls_back_once() {
        let mut ids = HeadingIdRegistry::new();
        assert_eq!(ids.ensure_unique("a-1"), "a-1");
        assert_eq!(ids.ensure_unique("a"), "a");
        // "a-1" is already taken, so the fallback collides with it.
        assert_eq!(ids.ensure_unique("a"), "a-1");
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut ids = HeadingIdRegistry::new();
        ids.ensure_unique("x");
        assert_eq!(ids.len(), 1);
        ids.clear();
        assert!(ids.is_empty());
        assert_eq!(ids.ensure_unique("x"), "x");
    }

    proptest! {
        #[test]
        fn colliding_candidates_stay_distinct(n in 1usize..40) {
            let mut ids = HeadingIdRegistry::new();
            let assigned: HashSet<_> = (0..n).map(|_| ids.ensure_unique("toc")).collect();
            prop_assert_eq!(assigned.len(), n);
        }

        #[test]
        fn assignment_is_deterministic(words in prop::collection::vec("[a-c]{1,2}", 0..20)) {
            let run = |words: &[String]| {
                let mut ids = HeadingIdRegistry::new();
                words.iter().map(|w| ids.ensure_unique(w)).collect::<Vec<_>>()
            };
            prop_assert_eq!(run(&words), run(&words));
        }
    }
}
