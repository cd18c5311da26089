//! Option shuffling with correct-index tracking.
//!
//! The permutation is injected into the pure `apply_permutation` so tests can
//! pin it; production draws a uniform permutation via Fisher–Yates
//! (`SliceRandom::shuffle`).

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::Question;

/// Uniformly random permutation of `0..len`.
pub fn random_permutation<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<usize> {
  let mut perm: Vec<usize> = (0..len).collect();
  perm.shuffle(rng);
  perm
}

/// Reorder options by `perm` (where `new_options[i] = options[perm[i]]`) and
/// re-point the correct index at wherever the originally-correct option landed.
///
/// Invariant: `out.options[out.correct_index] == q.options[q.correct_index]`.
pub fn apply_permutation(q: &Question, perm: &[usize]) -> Question {
  debug_assert_eq!(perm.len(), q.options.len());

  let options: Vec<String> = perm.iter().map(|&old| q.options[old].clone()).collect();
  let correct_index = perm
    .iter()
    .position(|&old| old == q.correct_index)
    .unwrap_or(0);

  Question {
    question: q.question.clone(),
    options,
    correct_index,
    explanation: q.explanation.clone(),
  }
}

/// Shuffle a question with a fresh random permutation.
pub fn shuffle_question(q: &Question) -> Question {
  let mut rng = rand::thread_rng();
  let perm = random_permutation(q.options.len(), &mut rng);
  apply_permutation(q, &perm)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn sample() -> Question {
    Question {
      question: "Q".into(),
      options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
      correct_index: 1,
      explanation: "x".into(),
    }
  }

  fn invert(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0usize; perm.len()];
    for (new_pos, &old_pos) in perm.iter().enumerate() {
      inv[old_pos] = new_pos;
    }
    inv
  }

  #[test]
  fn fixed_permutation_moves_options_and_index_together() {
    let q = sample();
    // new_options = [d, c, b, a]; correct "b" lands at position 2.
    let out = apply_permutation(&q, &[3, 2, 1, 0]);
    assert_eq!(out.options, vec!["d", "c", "b", "a"]);
    assert_eq!(out.correct_index, 2);
    assert_eq!(out.options[out.correct_index], q.options[q.correct_index]);
  }

  #[test]
  fn shuffle_preserves_correct_option_text() {
    let q = sample();
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
      let perm = random_permutation(4, &mut rng);
      let out = apply_permutation(&q, &perm);
      assert_eq!(out.options[out.correct_index], "b");
      let mut sorted = out.options.clone();
      sorted.sort();
      assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }
  }

  #[test]
  fn inverse_permutation_restores_original_order_and_index() {
    let q = sample();
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
      let perm = random_permutation(4, &mut rng);
      let shuffled = apply_permutation(&q, &perm);
      let restored = apply_permutation(&shuffled, &invert(&perm));
      assert_eq!(restored, q);
    }
  }

  #[test]
  fn identity_permutation_is_a_no_op() {
    let q = sample();
    assert_eq!(apply_permutation(&q, &[0, 1, 2, 3]), q);
  }
}
