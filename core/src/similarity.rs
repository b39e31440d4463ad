//! String similarity measures used for approximate lexicon matching.
//!
//! Scores are in `[0, 1]`, 1 meaning identical. The scorer only depends on the
//! [`Similarity`] trait, so the measure can be swapped without touching the
//! matching loop.

/// A symmetric string similarity in `[0, 1]`.
pub trait Similarity {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

impl<F> Similarity for F
where
    F: Fn(&str, &str) -> f64,
{
    fn similarity(&self, a: &str, b: &str) -> f64 {
        self(a, b)
    }
}

/// Plain Jaro similarity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jaro;

impl Similarity for Jaro {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        jaro(&a, &b)
    }
}

/// Jaro-Winkler similarity: Jaro plus a bonus for a shared prefix.
#[derive(Debug, Clone, Copy)]
pub struct JaroWinkler {
    /// Bonus per shared prefix character.
    pub prefix_scale: f64,
    /// Longest prefix that earns a bonus.
    pub max_prefix: usize,
    /// The prefix bonus only applies above this Jaro score.
    pub boost_threshold: f64,
}

impl Default for JaroWinkler {
    fn default() -> Self {
        Self {
            prefix_scale: 0.1,
            max_prefix: 4,
            boost_threshold: 0.7,
        }
    }
}

impl Similarity for JaroWinkler {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let sim = jaro(&a, &b);
        if sim <= self.boost_threshold {
            return sim;
        }
        let prefix = a
            .iter()
            .zip(b.iter())
            .take(self.max_prefix)
            .take_while(|(x, y)| x == y)
            .count();
        sim + prefix as f64 * self.prefix_scale * (1.0 - sim)
    }
}

fn jaro(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }

    let window = (a.len().max(b.len()) / 2).saturating_sub(1);
    let mut a_hit = vec![false; a.len()];
    let mut b_hit = vec![false; b.len()];
    let mut matches = 0usize;

    for (i, ca) in a.iter().enumerate() {
        let lo = i.saturating_sub(window);
        let hi = (i + window).min(b.len() - 1);
        if lo > hi {
            continue;
        }
        for j in lo..=hi {
            if !b_hit[j] && b[j] == *ca {
                a_hit[i] = true;
                b_hit[j] = true;
                matches += 1;
                break;
            }
        }
    }
    if matches == 0 {
        return 0.0;
    }

    // half-transpositions: matched characters that appear in a different order
    let a_matched = a.iter().zip(&a_hit).filter(|(_, hit)| **hit).map(|(c, _)| c);
    let b_matched = b.iter().zip(&b_hit).filter(|(_, hit)| **hit).map(|(c, _)| c);
    let transpositions = a_matched.zip(b_matched).filter(|(x, y)| x != y).count() / 2;

    let m = matches as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - transpositions as f64) / m) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn identical_and_disjoint() {
        let jw = JaroWinkler::default();
        assert_eq!(jw.similarity("happy", "happy"), 1.0);
        assert_eq!(jw.similarity("abc", "xyz"), 0.0);
        assert_eq!(jw.similarity("", "abc"), 0.0);
        assert_eq!(jw.similarity("", ""), 0.0);
    }

    #[test]
    fn textbook_values() {
        assert!(close(Jaro.similarity("MARTHA", "MARHTA"), 0.944));
        assert!(close(JaroWinkler::default().similarity("MARTHA", "MARHTA"), 0.961));
        assert!(close(JaroWinkler::default().similarity("DWAYNE", "DUANE"), 0.84));
        assert!(close(JaroWinkler::default().similarity("DIXON", "DICKSONX"), 0.813));
    }

    #[test]
    fn symmetric() {
        let jw = JaroWinkler::default();
        for (a, b) in [("happy", "hapy"), ("crate", "trace"), ("so", "sad")] {
            assert!(close(jw.similarity(a, b), jw.similarity(b, a)));
        }
    }

    #[test]
    fn prefix_boost_needs_high_base_score() {
        // Jaro("so", "sad") is ~0.61, below the boost threshold
        let jw = JaroWinkler::default();
        assert!(close(jw.similarity("so", "sad"), Jaro.similarity("so", "sad")));
    }

    #[test]
    fn closures_are_similarities() {
        let always = |_: &str, _: &str| 0.5;
        assert_eq!(always.similarity("a", "b"), 0.5);
    }
}
