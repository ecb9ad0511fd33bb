//! Property tests for the aligner, scorer and normalizer

use proptest::prelude::*;

use wer::normalize::tokenize;
use wer::{
    AlignmentOp, NormalizationConfig, Normalizer, WordSequence, align, edit_distance, score,
};

/// Two-row Levenshtein distance, independent of the aligner's table
fn levenshtein(a: &[String], b: &[String]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, x) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, y) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(x != y);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn counts(ops: &[AlignmentOp]) -> (usize, usize, usize, usize) {
    let mut hits = 0;
    let mut substitutions = 0;
    let mut deletions = 0;
    let mut insertions = 0;
    for op in ops {
        match op {
            AlignmentOp::Hit { .. } => hits += 1,
            AlignmentOp::Substitution { .. } => substitutions += 1,
            AlignmentOp::Deletion { .. } => deletions += 1,
            AlignmentOp::Insertion { .. } => insertions += 1,
        }
    }
    (hits, substitutions, deletions, insertions)
}

// a small vocabulary so sequences share words often
fn tokens() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-d]{1,2}", 0..12)
}

proptest! {
    #[test]
    fn self_alignment_is_all_hits(a in tokens()) {
        let ops = align(&a, &a);
        let all_hits = ops.iter().all(|op| matches!(op, AlignmentOp::Hit { .. }));
        prop_assert!(all_hits);
        prop_assert_eq!(ops.len(), a.len());
        if !a.is_empty() {
            prop_assert_eq!(score(&ops).unwrap().wer, 0.0);
        }
    }

    #[test]
    fn errors_equal_levenshtein_distance(a in tokens(), b in tokens()) {
        let ops = align(&a, &b);
        let (_, s, d, i) = counts(&ops);
        prop_assert_eq!(s + d + i, levenshtein(&a, &b));
        prop_assert_eq!(s + d + i, edit_distance(&a, &b));
        prop_assert!(s + d + i <= a.len() + b.len());
    }

    #[test]
    fn distance_is_symmetric(a in tokens(), b in tokens()) {
        prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));

        let (_, _, forward_d, forward_i) = counts(&align(&a, &b));
        let (_, _, backward_d, backward_i) = counts(&align(&b, &a));
        // deletions one way are insertions the other way, net of substitutions
        prop_assert_eq!(
            forward_d as isize - forward_i as isize,
            backward_i as isize - backward_d as isize
        );
    }

    #[test]
    fn counts_cover_both_sequences(a in tokens(), b in tokens()) {
        let ops = align(&a, &b);
        let (h, s, d, i) = counts(&ops);
        prop_assert_eq!(h + s + d, a.len());
        prop_assert_eq!(h + s + i, b.len());

        // every index is visited once, in order
        let reference: Vec<usize> = ops.iter().filter_map(AlignmentOp::reference_index).collect();
        let hypothesis: Vec<usize> = ops.iter().filter_map(AlignmentOp::hypothesis_index).collect();
        prop_assert_eq!(reference, (0..a.len()).collect::<Vec<_>>());
        prop_assert_eq!(hypothesis, (0..b.len()).collect::<Vec<_>>());
    }

    #[test]
    fn score_matches_counts(a in tokens(), b in tokens()) {
        prop_assume!(!a.is_empty());
        let result = score(&align(&a, &b)).unwrap();
        prop_assert_eq!(result.reference_words(), a.len());
        prop_assert_eq!(result.hypothesis_words(), b.len());
        let expected = result.errors() as f64 / a.len() as f64;
        prop_assert!((result.wer - expected).abs() < 1e-12);
    }

    #[test]
    fn normalizing_normalized_text_is_a_no_op(words in prop::collection::vec("[a-z]{1,8}", 0..10)) {
        let normalizer = Normalizer::new(&NormalizationConfig::default()).unwrap();
        let text = words.join(" ");
        prop_assert_eq!(normalizer.transform(&text), text.clone());
        prop_assert_eq!(tokenize(&text), words.clone());
        prop_assert_eq!(normalizer.normalize(&[text.as_str()]), WordSequence::Sentence(words));
    }

    #[test]
    fn normalization_is_idempotent(line in "[A-Za-z ,.!?']{0,40}") {
        let normalizer = Normalizer::new(&NormalizationConfig::default()).unwrap();
        let once = normalizer.transform(&line);
        prop_assert_eq!(normalizer.transform(&once), once);
    }
}
