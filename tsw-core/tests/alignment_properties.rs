use proptest::prelude::*;
use tsw_core::record::parse_record;
use tsw_core::*;

fn seq(events: &[(f64, &str)]) -> Sequence {
    events.iter().map(|&(t, l)| Event::new(t, l)).collect()
}

fn abc() -> SimilarityTable {
    SimilarityTable::with_defaults(["a", "b", "c"]).expect("default table")
}

fn non_gap_events(tokens: &[AlignedToken]) -> Vec<Event> {
    tokens.iter().filter_map(|t| t.event().cloned()).collect()
}

#[test]
fn closest_elapsed_times_win() {
    let s1 = seq(&[(1.0, "a"), (1.0, "a")]);
    let s2 = seq(&[(0.0, "a"), (10.0, "a"), (11.0, "a")]);
    let params = AlignParams::default()
        .with_gap_penalty(0.4)
        .with_time_param(0.5)
        .with_method("PropDiff".parse().unwrap());

    let alignments = align(&s1, &s2, &abc(), &params).unwrap();
    let best = &alignments[0];

    assert_eq!(best.aligned_count, 2);
    assert!(best.raw_score > 0.0);
    assert_eq!(best.s1_span, Span::new(0, 2));
    assert_eq!(best.s2_span, Span::new(1, 3));
    let expected = (1.0 - 0.5 * 9.0 / 10.0) + (1.0 - 0.5 * 10.0 / 11.0);
    assert!((best.raw_score - expected).abs() < 1e-9);
}

fn two_occurrences() -> (Sequence, Sequence, SimilarityTable) {
    // the long sequence is s1 here, so the exclusion runs along its positions
    let long = parse_record("0.a;7.b;7.c;3.x;5.y;10.a;7.b;2.x;7.c;").unwrap();
    let short = parse_record("0.a;7.b;7.c;").unwrap();
    let table = SimilarityTable::with_defaults(["a", "b", "c", "x", "y"]).unwrap();
    (long, short, table)
}

#[test]
fn two_noisy_occurrences_give_disjoint_alignments() {
    let (long, short, table) = two_occurrences();
    let params = AlignParams::default().with_mem(2).unwrap().with_remove_overlap(true);

    let alignments = align(&long, &short, &table, &params).unwrap();

    assert_eq!(alignments.len(), 2);
    assert!(!alignments[0].s1_span.overlaps(&alignments[1].s1_span));
    assert_eq!(alignments[0].s1_span, Span::new(0, 3));
    assert_eq!(alignments[1].s1_span, Span::new(5, 9));
    assert!(alignments[0].raw_score >= alignments[1].raw_score);
    assert_eq!(alignments[1].s2_gaps, 1);
}

#[test]
fn template_found_twice_in_record_along_record_axis() {
    let (long, short, table) = two_occurrences();
    let params = AlignParams::default()
        .with_mem(2)
        .unwrap()
        .with_exclusion(ExclusionAxis::S2);

    // template as s1, record as s2
    let alignments = align(&short, &long, &table, &params).unwrap();

    assert_eq!(alignments.len(), 2);
    assert!(!alignments[0].s2_span.overlaps(&alignments[1].s2_span));
}

#[test]
fn mem_zero_returns_nothing() {
    let (long, short, table) = two_occurrences();
    let params = AlignParams::default().with_mem(0).unwrap();
    let outcome = TswAligner::new(&table, params).unwrap().align_detailed(&long, &short).unwrap();

    assert!(outcome.alignments.is_empty());
    assert!(outcome.matrices.h.as_slice().iter().any(|&v| v > 0.0));
}

#[test]
fn unbounded_mem_returns_descending_disjoint_alignments() {
    let (long, short, table) = two_occurrences();
    let params = AlignParams::default().with_mem(-1).unwrap();
    let alignments = align(&long, &short, &table, &params).unwrap();

    assert!(alignments.len() >= 2);
    for pair in alignments.windows(2) {
        assert!(pair[0].raw_score >= pair[1].raw_score);
    }
    for (i, a) in alignments.iter().enumerate() {
        for b in &alignments[i + 1..] {
            assert!(!a.s1_span.overlaps(&b.s1_span));
        }
    }
}

#[test]
fn self_alignment_is_gapless() {
    let s = parse_record("0.a;7.b;7.c;14.a;").unwrap();
    let params = AlignParams::default().with_gap_penalty(2.0);
    let alignments = align(&s, &s.clone(), &abc(), &params).unwrap();
    let best = &alignments[0];

    assert_eq!(best.aligned_count, s.len());
    assert_eq!(best.s1_gaps + best.s2_gaps, 0);
    assert!(best.s1_aligned.iter().all(|t| !t.is_gap()));
    assert!((best.raw_score - s.len() as f64 * 1.0).abs() < 1e-9);
}

#[test]
fn consecutive_up_moves_become_s1_gaps() {
    let table = SimilarityTable::with_defaults(["a", "b", "x", "y"]).unwrap();
    let s1 = seq(&[(0.0, "a"), (0.0, "b")]);
    let s2 = seq(&[(0.0, "a"), (0.0, "x"), (0.0, "y"), (0.0, "b")]);
    let params = AlignParams::default()
        .with_gap_penalty(0.1)
        .with_method(TimeWeightMethod::Uniform);

    let best = align(&s1, &s2, &table, &params).unwrap().remove(0);

    assert_eq!(best.aligned_count, 2);
    assert_eq!(best.s1_gaps, 2);
    assert_eq!(best.s1_aligned.iter().filter(|t| t.is_gap()).count(), 2);
    assert!(best.s2_aligned.iter().all(|t| !t.is_gap()));
    assert!((best.raw_score - 1.8).abs() < 1e-9);
}

#[test]
fn corrupt_trace_is_an_error() {
    let trace = TraceMatrix::from_codes(2, 2, vec![0, 0, 0, 5]).unwrap();
    let s = seq(&[(0.0, "a")]);
    let err = reconstruct(&trace, &s, &s, Cell::new(1, 1)).unwrap_err();
    assert!(err.is_internal());
}

#[test]
fn unknown_method_is_invalid_parameter() {
    assert!(matches!(
        "Spline".parse::<TimeWeightMethod>(),
        Err(TswError::InvalidParameter(_))
    ));
}

fn label() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("a"), Just("b"), Just("c")]
}

fn sequence(max_len: usize) -> impl Strategy<Value = Sequence> {
    prop::collection::vec((0u32..20, label()), 0..max_len)
        .prop_map(|events| events.into_iter().map(|(t, l)| Event::new(t as f64, l)).collect())
}

fn params() -> impl Strategy<Value = AlignParams> {
    (0.0f64..2.0, 0.0f64..1.0, 0usize..3).prop_map(|(g, t, m)| {
        AlignParams::default()
            .with_gap_penalty(g)
            .with_time_param(t)
            .with_method(TimeWeightMethod::ALL[m])
    })
}

proptest! {
    #[test]
    fn matrices_respect_floor_and_trace_invariant(s1 in sequence(12), s2 in sequence(12), p in params()) {
        let outcome = TswAligner::new(&abc(), p).unwrap().align_detailed(&s1, &s2).unwrap();
        let m = &outcome.matrices;

        for row in 0..m.h.rows() {
            for col in 0..m.h.cols() {
                let h = m.h.get(row, col);
                prop_assert!(h >= 0.0);
                let none = m.trace.get(row, col).unwrap() == TraceCode::None;
                prop_assert_eq!(none, h == 0.0);
            }
        }
    }

    #[test]
    fn requests_are_deterministic(s1 in sequence(10), s2 in sequence(10), p in params()) {
        let alphabet = abc();
        let aligner = TswAligner::new(&alphabet, p).unwrap();
        let first = aligner.align_detailed(&s1, &s2).unwrap();
        let second = aligner.align_detailed(&s1, &s2).unwrap();

        prop_assert_eq!(&first.matrices.h, &second.matrices.h);
        prop_assert_eq!(&first.matrices.trace, &second.matrices.trace);
        prop_assert_eq!(&first.alignments, &second.alignments);
    }

    #[test]
    fn reconstruction_is_idempotent_and_round_trips(s1 in sequence(10), s2 in sequence(10), p in params()) {
        let outcome = TswAligner::new(&abc(), p).unwrap().align_detailed(&s1, &s2).unwrap();

        for hit in &outcome.extraction.hits {
            let a = reconstruct(&outcome.matrices.trace, &s1, &s2, hit.cell).unwrap();
            let b = reconstruct(&outcome.matrices.trace, &s1, &s2, hit.cell).unwrap();
            prop_assert_eq!(&a, &b);

            prop_assert_eq!(non_gap_events(&a.s1_aligned), s1.events[a.s1_span.range()].to_vec());
            prop_assert_eq!(non_gap_events(&a.s2_aligned), s2.events[a.s2_span.range()].to_vec());
            prop_assert_eq!(a.s1_aligned.len(), a.s2_aligned.len());
            prop_assert!(a.aligned_count >= 1);
        }
    }

    #[test]
    fn overlap_removal_keeps_s1_spans_disjoint(s1 in sequence(14), s2 in sequence(8), p in params()) {
        let alignments = align(&s1, &s2, &abc(), &p.with_remove_overlap(true)).unwrap();
        for (i, a) in alignments.iter().enumerate() {
            for b in &alignments[i + 1..] {
                prop_assert!(!a.s1_span.overlaps(&b.s1_span));
            }
        }
    }
}
