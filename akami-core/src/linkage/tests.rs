//! Unit tests for linkage-tree construction, merge propagation, and cutting.

use std::num::NonZeroUsize;

use rstest::rstest;

use crate::distance::Affinity;
use crate::matrix::{DistanceMatrix, FeatureMatrix};

use super::moments::WardMoments;
use super::{
    Connectivity, Linkage, LinkageError, LinkageTree, NeighbourMap, TreeAdvisory, TreeInput,
    build_tree,
};

const EPSILON: f64 = 1e-6;

/// Six 2-D samples with a known Ward merge order, used as the numeric
/// reference throughout.
fn reference_samples() -> FeatureMatrix {
    FeatureMatrix::from_rows(
        "reference",
        vec![
            1.430_548_25,
            -7.569_348_9,
            6.958_878_39,
            6.822_933_82,
            2.871_378_46,
            -9.682_485_79,
            7.879_747_64,
            -6.054_858_03,
            8.240_183_64,
            -6.094_956_02,
            7.390_202_62,
            8.540_043_55,
        ],
        2,
    )
    .expect("reference matrix must be well formed")
}

fn ward_reference_tree(hint: Option<usize>) -> LinkageTree {
    let matrix = reference_samples();
    let input = TreeInput::Features {
        matrix: &matrix,
        affinity: Affinity::Euclidean,
    };
    let hint = hint.map(|k| NonZeroUsize::new(k).expect("non-zero hint"));
    build_tree(input, None, Linkage::Ward, hint).expect("tree construction must succeed")
}

fn line_samples() -> FeatureMatrix {
    FeatureMatrix::from_rows("line", vec![0.0, 0.4, 1.0, 5.0], 1)
        .expect("line matrix must be well formed")
}

fn assert_heights_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (index, (&got, &want)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (got - want).abs() < EPSILON,
            "height {index}: got {got}, want {want}"
        );
    }
}

mod neighbour_map {
    use super::*;

    fn row(entries: &[(usize, f64)]) -> NeighbourMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn max_merge_keeps_larger_shared_distance_and_singletons() {
        let a = row(&[(2, 1.0), (3, 4.0)]);
        let b = row(&[(2, 2.5), (5, 0.5)]);
        let mask = vec![true; 6];

        let merged = NeighbourMap::max_merge(&a, &b, &mask, 1, 1);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged.get(2).expect("shared key"), 2.5);
        assert_eq!(merged.get(3).expect("left-only key"), 4.0);
        assert_eq!(merged.get(5).expect("right-only key"), 0.5);
    }

    #[test]
    fn min_merge_keeps_smaller_shared_distance() {
        let a = row(&[(2, 1.0), (3, 4.0)]);
        let b = row(&[(2, 2.5)]);
        let mask = vec![true; 4];

        let merged = NeighbourMap::min_merge(&a, &b, &mask, 1, 1);

        assert_eq!(merged.get(2).expect("shared key"), 1.0);
        assert_eq!(merged.get(3).expect("left-only key"), 4.0);
    }

    #[test]
    fn average_merge_weights_by_cluster_sizes() {
        let a = row(&[(4, 2.0)]);
        let b = row(&[(4, 5.0)]);
        let mask = vec![true; 5];

        let merged = NeighbourMap::average_merge(&a, &b, &mask, 3, 1);

        let expected = (3.0 * 2.0 + 1.0 * 5.0) / 4.0;
        assert!((merged.get(4).expect("shared key") - expected).abs() < EPSILON);
    }

    #[test]
    fn average_merge_keeps_one_sided_distance_unweighted() {
        let a = row(&[(4, 2.0)]);
        let b = row(&[(5, 7.0)]);
        let mask = vec![true; 6];

        let merged = NeighbourMap::average_merge(&a, &b, &mask, 3, 2);

        assert_eq!(merged.get(4).expect("left-only key"), 2.0);
        assert_eq!(merged.get(5).expect("right-only key"), 7.0);
    }

    #[rstest]
    #[case(NeighbourMap::max_merge)]
    #[case(NeighbourMap::average_merge)]
    #[case(NeighbourMap::min_merge)]
    fn combinators_drop_masked_out_neighbours(
        #[case] combine: fn(&NeighbourMap, &NeighbourMap, &[bool], usize, usize) -> NeighbourMap,
    ) {
        let a = row(&[(1, 0.5), (2, 1.5)]);
        let b = row(&[(1, 0.7), (3, 2.5)]);
        let mut mask = vec![true; 4];
        mask[1] = false;

        let merged = combine(&a, &b, &mask, 1, 1);

        assert!(!merged.contains(1), "dissolved neighbour must be dropped");
        assert!(merged.contains(2));
        assert!(merged.contains(3));
    }
}

mod ward_moments {
    use super::*;

    #[test]
    fn singleton_cost_is_half_squared_distance() {
        let data = vec![0.0, 0.0, 3.0, 4.0];
        let moments = WardMoments::from_samples(&data, 2, 2);

        // ||(0,0) - (3,4)||^2 = 25; singleton pair cost is 25 * 1 / 2.
        assert!((moments.cost(0, 1) - 12.5).abs() < EPSILON);
    }

    #[test]
    fn merge_accumulates_counts_and_sums() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 0.0];
        let mut moments = WardMoments::from_samples(&data, 5, 1);

        moments.merge(0, 1, 5);
        moments.merge(5, 2, 6);

        // Centroid of {1, 2, 3} is 2; point 4 sits at 0.
        // Cost = (2 - 0)^2 * 3 * 1 / 4 = 3.
        assert!((moments.cost(6, 4) - 3.0).abs() < EPSILON);
    }
}

mod connectivity {
    use super::*;

    #[test]
    fn from_edges_symmetrises_and_deduplicates() {
        let conn = Connectivity::from_edges(4, &[(0, 1), (1, 0), (1, 2), (1, 1), (2, 3)])
            .expect("valid edges");

        assert_eq!(conn.len(), 4);
        assert_eq!(conn.neighbours(0), &[1]);
        assert_eq!(conn.neighbours(1), &[0, 2]);
        assert_eq!(conn.neighbours(3), &[2]);
        assert_eq!(conn.component_count(), 1);
    }

    #[test]
    fn from_edges_rejects_out_of_range_endpoint() {
        let err = Connectivity::from_edges(3, &[(0, 7)]).expect_err("edge past the sample set");
        assert_eq!(err, LinkageError::InvalidEdge { node: 7, n_leaves: 3 });
    }

    #[test]
    fn from_dense_reads_nonzero_entries_as_edges() {
        #[rustfmt::skip]
        let dense = vec![
            0.0, 1.0, 0.0,
            1.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
        ];
        let conn = Connectivity::from_dense(3, &dense).expect("square buffer");

        assert_eq!(conn.neighbours(0), &[1]);
        assert!(conn.neighbours(2).is_empty());
        assert_eq!(conn.component_count(), 2);
    }

    #[test]
    fn from_dense_rejects_non_square_buffer() {
        let err = Connectivity::from_dense(3, &[0.0; 7]).expect_err("7 values is not 3x3");
        assert!(matches!(err, LinkageError::ShapeMismatch { .. }));
    }

    #[test]
    fn full_graph_connects_every_pair() {
        let conn = Connectivity::full(4);

        assert_eq!(conn.component_count(), 1);
        assert_eq!(conn.neighbours(2), &[0, 1, 3]);
    }

    #[test]
    fn isolated_samples_count_as_components() {
        let conn = Connectivity::from_edges(5, &[(0, 1)]).expect("valid edges");
        assert_eq!(conn.component_count(), 4);
    }
}

mod tree_construction {
    use super::*;

    #[test]
    fn ward_reference_dataset_reproduces_known_merges() {
        let tree = ward_reference_tree(None);

        assert_eq!(tree.n_leaves(), 6);
        assert_eq!(tree.n_nodes(), 11);
        assert_eq!(tree.children(), &[(3, 4), (1, 5), (0, 2), (6, 8), (7, 9)]);
        assert_heights_close(
            tree.heights(),
            &[0.362_659_56, 1.770_453_73, 2.557_604_19, 9.102_083_46, 24.778_437_9],
        );
    }

    #[test]
    fn leaf_counts_and_parents_describe_the_merge_order() {
        let tree = ward_reference_tree(None);

        assert_eq!(
            tree.leaf_counts(),
            &[1, 1, 1, 1, 1, 1, 2, 2, 2, 4, 6]
        );
        let parents = tree.parents();
        assert_eq!(parents[3], 6);
        assert_eq!(parents[4], 6);
        assert_eq!(parents[6], 9);
        assert_eq!(parents[8], 9);
        assert_eq!(parents[10], 10, "root points at itself");
    }

    #[test]
    fn heights_are_weakly_non_decreasing() {
        let tree = ward_reference_tree(None);
        for pair in tree.heights().windows(2) {
            assert!(pair[0] <= pair[1], "heights must not invert");
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let first = ward_reference_tree(None);
        let second = ward_reference_tree(None);
        assert_eq!(first, second);
    }

    #[test]
    fn omitted_connectivity_matches_explicit_complete_graph() {
        let matrix = reference_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };
        let full = Connectivity::full(matrix.rows());

        let unconstrained =
            build_tree(input, None, Linkage::Ward, None).expect("unconstrained tree");
        let constrained =
            build_tree(input, Some(&full), Linkage::Ward, None).expect("constrained tree");

        assert_eq!(unconstrained, constrained);
    }

    #[test]
    fn single_linkage_chains_nearest_neighbours() {
        let matrix = line_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let tree = build_tree(input, None, Linkage::Single, None).expect("tree");

        assert_eq!(tree.children(), &[(0, 1), (2, 4), (3, 5)]);
        assert_heights_close(tree.heights(), &[0.4, 0.6, 4.0]);
    }

    #[test]
    fn complete_linkage_uses_farthest_pair_distances() {
        let matrix = line_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let tree = build_tree(input, None, Linkage::Complete, None).expect("tree");

        assert_eq!(tree.children(), &[(0, 1), (2, 4), (3, 5)]);
        assert_heights_close(tree.heights(), &[0.4, 1.0, 5.0]);
    }

    #[test]
    fn average_linkage_weights_merged_rows_by_size() {
        let matrix = line_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let tree = build_tree(input, None, Linkage::Average, None).expect("tree");

        assert_eq!(tree.children(), &[(0, 1), (2, 4), (3, 5)]);
        assert_heights_close(tree.heights(), &[0.4, 0.8, 13.6 / 3.0]);
    }

    #[rstest]
    #[case(Linkage::Complete)]
    #[case(Linkage::Average)]
    #[case(Linkage::Single)]
    fn precomputed_distances_match_feature_path(#[case] linkage: Linkage) {
        let matrix = line_samples();
        let feature_input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };
        let n = matrix.rows();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let diff = matrix.data()[i] - matrix.data()[j];
                values[i * n + j] = diff.abs();
            }
        }
        let distances = DistanceMatrix::from_rows("line", values).expect("square buffer");
        let precomputed_input = TreeInput::Precomputed { matrix: &distances };

        let from_features = build_tree(feature_input, None, linkage, None).expect("tree");
        let from_distances = build_tree(precomputed_input, None, linkage, None).expect("tree");

        assert_eq!(from_features.children(), from_distances.children());
        assert_heights_close(from_features.heights(), from_distances.heights());
    }

    #[test]
    fn disconnected_graph_is_closed_with_forced_merges() {
        let matrix = FeatureMatrix::from_rows(
            "two islands",
            vec![0.0, 0.0, 1.0, 0.0, 10.0, 0.0, 11.0, 0.0],
            2,
        )
        .expect("matrix");
        let conn = Connectivity::from_edges(4, &[(0, 1), (2, 3)]).expect("edges");
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let tree = build_tree(input, Some(&conn), Linkage::Complete, None).expect("tree");

        assert_eq!(tree.n_components(), 2);
        assert_eq!(
            tree.advisories(),
            &[TreeAdvisory::Disconnected { components: 2 }]
        );
        assert_eq!(tree.children(), &[(0, 1), (2, 3), (4, 5)]);
        // The forced top-level merge reuses the maximum regular height.
        assert_heights_close(tree.heights(), &[1.0, 1.0, 1.0]);
        assert!(!tree.is_partial());
    }

    #[test]
    fn cluster_hint_stops_construction_early() {
        let tree = ward_reference_tree(Some(3));

        assert_eq!(tree.children().len(), 3);
        assert!(tree.is_partial());
        assert_eq!(
            tree.advisories(),
            &[TreeAdvisory::PartialTree { n_clusters: 3 }]
        );
        assert_eq!(tree.children(), &[(3, 4), (1, 5), (0, 2)]);
    }

    #[test]
    fn cluster_hint_at_leaf_count_builds_the_full_tree() {
        let tree = ward_reference_tree(Some(6));
        assert_eq!(tree.children().len(), 5);
        assert!(tree.advisories().is_empty());
    }
}

mod preconditions {
    use super::*;

    #[test]
    fn rejects_single_sample() {
        let matrix = FeatureMatrix::from_rows("lonely", vec![1.0, 2.0], 2).expect("matrix");
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let err = build_tree(input, None, Linkage::Ward, None).expect_err("one sample");
        assert_eq!(err, LinkageError::InsufficientSamples { items: 1 });
    }

    #[test]
    fn rejects_connectivity_of_the_wrong_size() {
        let matrix = reference_samples();
        let conn = Connectivity::from_edges(3, &[(0, 1)]).expect("edges");
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };

        let err = build_tree(input, Some(&conn), Linkage::Ward, None).expect_err("wrong size");
        assert_eq!(err, LinkageError::ShapeMismatch { rows: 3, expected: 6 });
    }

    #[rstest]
    #[case(Affinity::Manhattan)]
    #[case(Affinity::Cosine)]
    fn rejects_ward_over_non_euclidean_affinity(#[case] affinity: Affinity) {
        let matrix = reference_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity,
        };

        let err = build_tree(input, None, Linkage::Ward, None).expect_err("non-Euclidean ward");
        assert_eq!(
            err,
            LinkageError::IncompatibleAffinity {
                affinity,
                linkage: Linkage::Ward,
            }
        );
    }

    #[test]
    fn rejects_ward_over_precomputed_distances() {
        let distances =
            DistanceMatrix::from_rows("pre", vec![0.0, 1.0, 1.0, 0.0]).expect("matrix");
        let input = TreeInput::Precomputed { matrix: &distances };

        let err = build_tree(input, None, Linkage::Ward, None).expect_err("ward needs features");
        assert_eq!(
            err,
            LinkageError::IncompatibleAffinity {
                affinity: Affinity::Precomputed,
                linkage: Linkage::Ward,
            }
        );
    }

    #[test]
    fn rejects_precomputed_affinity_over_features() {
        let matrix = line_samples();
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Precomputed,
        };

        let err = build_tree(input, None, Linkage::Complete, None).expect_err("no distances given");
        assert!(matches!(err, LinkageError::IncompatibleAffinity { .. }));
    }

    #[test]
    fn rejects_non_finite_precomputed_distance() {
        #[rustfmt::skip]
        let values = vec![
            0.0, f64::NAN, 2.0,
            f64::NAN, 0.0, 3.0,
            2.0, 3.0, 0.0,
        ];
        let distances = DistanceMatrix::from_rows("nan", values).expect("matrix");
        let input = TreeInput::Precomputed { matrix: &distances };

        let err = build_tree(input, None, Linkage::Complete, None).expect_err("NaN distance");
        assert_eq!(err, LinkageError::NonFiniteDistance { left: 0, right: 1 });
    }
}

mod cutting {
    use super::*;

    #[test]
    fn cut_into_one_cluster_labels_everything_zero() {
        let tree = ward_reference_tree(None);
        let labels = tree.cut(1).expect("cut at the root");
        assert_eq!(labels, vec![0; 6]);
    }

    #[test]
    fn cut_into_two_splits_at_the_root() {
        let tree = ward_reference_tree(None);
        let labels = tree.cut(2).expect("cut below the root");
        // Node 7 = {1, 5}; node 9 = {0, 2, 3, 4}. Roots label ascending.
        assert_eq!(labels, vec![1, 0, 1, 1, 1, 0]);
    }

    #[test]
    fn cut_into_leaf_count_assigns_identity_labels() {
        let tree = ward_reference_tree(None);
        let labels = tree.cut(6).expect("singleton cut");
        assert_eq!(labels, vec![0, 1, 2, 3, 4, 5]);
    }

    #[rstest]
    #[case(0)]
    #[case(7)]
    fn cut_rejects_counts_outside_the_leaf_range(#[case] k: usize) {
        let tree = ward_reference_tree(None);
        let err = tree.cut(k).expect_err("out-of-range cut");
        assert_eq!(
            err,
            LinkageError::InvalidClusterCount {
                requested: k,
                n_leaves: 6,
            }
        );
    }

    #[test]
    fn partial_tree_cuts_at_its_frontier() {
        let partial = ward_reference_tree(Some(3));
        let labels = partial.cut(3).expect("cut at the stop count");
        // Roots 6 = {3, 4}, 7 = {1, 5}, 8 = {0, 2}, labelled ascending.
        assert_eq!(labels, vec![2, 1, 2, 0, 0, 1]);
    }

    #[test]
    fn partial_tree_cut_matches_full_tree_cut() {
        let full = ward_reference_tree(None);
        let partial = ward_reference_tree(Some(3));
        assert_eq!(
            full.cut(3).expect("full cut"),
            partial.cut(3).expect("partial cut")
        );
    }

    #[test]
    fn partial_tree_rejects_cuts_below_its_frontier() {
        let partial = ward_reference_tree(Some(3));
        let err = partial.cut(2).expect_err("frontier has three roots");
        assert_eq!(
            err,
            LinkageError::PartialTreeCut {
                requested: 2,
                available: 3,
            }
        );
    }

    #[test]
    fn forced_merge_tree_cuts_along_component_boundaries() {
        let matrix = FeatureMatrix::from_rows(
            "two islands",
            vec![0.0, 0.0, 1.0, 0.0, 10.0, 0.0, 11.0, 0.0],
            2,
        )
        .expect("matrix");
        let conn = Connectivity::from_edges(4, &[(0, 1), (2, 3)]).expect("edges");
        let input = TreeInput::Features {
            matrix: &matrix,
            affinity: Affinity::Euclidean,
        };
        let tree = build_tree(input, Some(&conn), Linkage::Complete, None).expect("tree");

        let labels = tree.cut(2).expect("cut at the component boundary");
        assert_eq!(labels, vec![0, 0, 1, 1]);
    }
}

mod criterion_parsing {
    use super::*;

    #[rstest]
    #[case("ward", Linkage::Ward)]
    #[case("complete", Linkage::Complete)]
    #[case("average", Linkage::Average)]
    #[case("single", Linkage::Single)]
    fn parses_known_criteria(#[case] name: &str, #[case] expected: Linkage) {
        let parsed: Linkage = name.parse().expect("known criterion");
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), name);
    }

    #[test]
    fn rejects_unknown_criterion() {
        let err = "centroid".parse::<Linkage>().expect_err("unsupported");
        assert_eq!(
            err,
            LinkageError::UnsupportedCriterion {
                name: "centroid".to_owned(),
            }
        );
    }
}
