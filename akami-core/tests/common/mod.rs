use akami_core::FeatureMatrix;

/// Six 2-D samples with a known Ward merge order.
///
/// The merge sequence is `(3, 4)`, `(1, 5)`, `(0, 2)`, `(6, 8)`, `(7, 9)`;
/// cutting at two clusters separates `{1, 5}` from the rest.
#[must_use]
pub fn reference_samples() -> FeatureMatrix {
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

/// Two tight groups far apart on the x axis.
#[must_use]
pub fn two_blobs() -> FeatureMatrix {
    FeatureMatrix::from_rows(
        "two blobs",
        vec![0.0, 0.0, 0.2, 0.1, 0.1, 0.3, 9.0, 9.0, 9.2, 9.1, 9.1, 9.3],
        2,
    )
    .expect("blob matrix must be well formed")
}
