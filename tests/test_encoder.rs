mod common;

use common::{assert_well_formed, random_samples};
use comm_empirical::{
    bin_boundaries, encode, encode_all, encode_sorted, fingerprint, to_interchange_string, BinCount, Error,
    Parameter, ParameterSet,
};

#[test]
fn test_proportions_sum_to_one() {
    for seed in 0..40_u64 {
        let len = 1 + (seed as usize * 137) % 5000;
        let samples = random_samples(seed, len, -1000, 1000);
        for bins in [1, 2, 3, 7, 10, 50] {
            let dist = encode(Parameter::NOwned, &samples, BinCount::Fixed(bins)).expect("nonempty");
            assert_well_formed(&dist);
            if !dist.is_degenerate() {
                assert_eq!(dist.bin_count(), bins, "seed={seed} bins={bins}");
            }
        }
    }
}

#[test]
fn test_all_identical_samples_encode_to_one_bin() {
    let dist = encode(Parameter::BlockSize, &[5, 5, 5], BinCount::Fixed(10)).expect("nonempty");
    assert!(dist.is_degenerate());
    assert_eq!(dist.bin_count(), 1);
    let bin = &dist.bins[0];
    assert_eq!((bin.min, bin.max, bin.mean, bin.stdev), (5, 5, 5, 0));
    assert_eq!(bin.proportion, 1.0);
    assert_eq!((dist.min, dist.max, dist.mean, dist.stdev), (5, 5, 5, 0));
}

#[test]
fn test_empty_samples_are_not_encoded() {
    assert!(encode(Parameter::Stride, &[], BinCount::Auto).is_none());
    assert!(encode_sorted(Parameter::Stride, &[], 3).is_none());
}

#[test]
fn test_auto_bin_count() {
    assert_eq!(BinCount::Auto.resolve(3500), 4);
    assert_eq!(BinCount::Auto.resolve(2500), 2);
    assert_eq!(BinCount::Auto.resolve(4600), 5);
    assert_eq!(BinCount::Auto.resolve(120), 1);
    assert_eq!(BinCount::Auto.resolve(0), 1);
    assert_eq!(BinCount::Fixed(7).resolve(3500), 7);

    let samples = random_samples(3, 3500, 0, 10_000);
    let dist = encode(Parameter::NOwned, &samples, BinCount::Auto).expect("nonempty");
    assert_eq!(dist.bin_count(), 4);
}

#[test]
fn test_bin_count_parsing() {
    assert_eq!("auto".parse::<BinCount>().expect("auto"), BinCount::Auto);
    assert_eq!("12".parse::<BinCount>().expect("12"), BinCount::Fixed(12));
    for bad in ["0", "-3", "+4", "1.5", "many", ""] {
        assert!(
            matches!(bad.parse::<BinCount>(), Err(Error::InvalidBinCount(_))),
            "{bad} must be rejected"
        );
    }
    assert_eq!(BinCount::Fixed(3).to_string(), "3");
    assert_eq!(BinCount::Auto.to_string(), "auto");
}

#[test]
fn test_boundaries_accumulate_with_rounding() {
    // Width 3.33: accumulated 3.33, 6.67, 10.0 round to unequal widths 3, 4, 3.
    assert_eq!(bin_boundaries(0, 10, 3), vec![0, 3, 7, 10]);
    // Width 2.5: 2.5 rounds to even.
    assert_eq!(bin_boundaries(0, 5, 2), vec![0, 2, 5]);
    // More bins than distinct values yields repeated boundaries.
    assert_eq!(bin_boundaries(0, 2, 4), vec![0, 0, 1, 2, 2]);
    assert_eq!(bin_boundaries(-10, 10, 4), vec![-10, -5, 0, 5, 10]);
}

#[test]
fn test_full_i64_range_encodes() {
    assert_eq!(
        bin_boundaries(i64::MIN, i64::MAX, 2),
        vec![i64::MIN, 0, i64::MAX]
    );

    for bins in [1, 2, 3, 7] {
        let dist = encode(Parameter::Stride, &[i64::MIN, i64::MAX], BinCount::Fixed(bins))
            .expect("nonempty");
        assert_well_formed(&dist);
        assert_eq!(dist.bin_count(), bins);
        assert_eq!((dist.min, dist.max), (i64::MIN, i64::MAX));
    }

    let dist = encode(Parameter::Stride, &[i64::MIN, -1, 1, i64::MAX], BinCount::Fixed(2))
        .expect("nonempty");
    assert_well_formed(&dist);
    assert_eq!(dist.mean, 0);
    assert_eq!(dist.bins[0].proportion, 0.5);
    assert_eq!(dist.bins[1].proportion, 0.5);
}

#[test]
fn test_bin_members_and_stats() {
    let samples = [1, 2, 3, 4, 10, 10, 20];
    let dist = encode(Parameter::NRemote, &samples, BinCount::Fixed(2)).expect("nonempty");
    assert_well_formed(&dist);
    // Boundaries: 1, 10 (10.5 rounds to even), 20.
    let [first, second] = &dist.bins[..] else {
        panic!("expected two bins: {dist:?}");
    };
    assert_eq!((first.min, first.max), (1, 10));
    assert_eq!((second.min, second.max), (10, 20));
    assert_eq!(first.proportion, 4.0 / 7.0);
    assert_eq!(second.proportion, 3.0 / 7.0);
    assert_eq!((first.mean, first.stdev), (2, 1)); // mean 2.5 ties to 2, stdev 1.29
    assert_eq!((second.mean, second.stdev), (13, 6)); // mean 13.33, stdev 5.77
    assert_eq!((dist.min, dist.max, dist.mean, dist.stdev), (1, 20, 7, 7));
}

#[test]
fn test_single_member_bin() {
    let dist = encode(Parameter::NOwned, &[10, 20], BinCount::Fixed(2)).expect("nonempty");
    assert_eq!((dist.bins[0].mean, dist.bins[0].stdev), (10, 0));
    assert_eq!((dist.bins[1].mean, dist.bins[1].stdev), (20, 0));
}

#[test]
fn test_gap_bins_are_kept() {
    let dist = encode(Parameter::NOwned, &[0, 0, 10, 10], BinCount::Fixed(3)).expect("nonempty");
    assert_well_formed(&dist);
    assert_eq!(dist.bin_count(), 3);
    let gap = &dist.bins[1];
    assert!(gap.is_gap());
    assert_eq!((gap.min, gap.max), (3, 7));
    assert_eq!((gap.proportion, gap.mean, gap.stdev), (0.0, 0, 0));

    let text = dist.to_string();
    assert!(
        text.contains("\n3, 7, 0.00000000000000000000, 0, 0\n"),
        "gap line must be serialized: {text}"
    );
}

#[test]
fn test_max_lands_in_last_bin() {
    let dist = encode(Parameter::Stride, &[-5, 0, 5], BinCount::Fixed(2)).expect("nonempty");
    // Boundaries -5, 0, 5: 0 is not below 0 so it belongs to the last bin, together with the max.
    assert_eq!(dist.bins[0].proportion, 1.0 / 3.0);
    assert_eq!(dist.bins[1].proportion, 2.0 / 3.0);
}

fn sample_set() -> ParameterSet {
    ParameterSet::from_fn(|p| match p {
        Parameter::NOwned => random_samples(1, 4000, 100, 5000),
        Parameter::NRemote => random_samples(2, 3000, 0, 800),
        Parameter::BlockSize => vec![],
        Parameter::Stride => random_samples(4, 2500, -50, 50),
        Parameter::CommPartners => vec![4; 300],
        Parameter::UpdatesPerSetup => random_samples(6, 40, 1, 12),
    })
}

#[test]
fn test_encode_all_is_canonical_and_deterministic() {
    let params = sample_set();
    let single = encode_all(&params, BinCount::Auto, 1);

    let keys: Vec<Parameter> = single.keys().copied().collect();
    assert_eq!(
        keys,
        vec![
            Parameter::NOwned,
            Parameter::NRemote,
            Parameter::Stride,
            Parameter::CommPartners,
            Parameter::UpdatesPerSetup,
        ],
        "empty parameters are omitted and order is canonical"
    );
    for dist in single.values() {
        assert_well_formed(dist);
    }

    let reference = to_interchange_string(&single);
    for workers in [0, 2, 3, 6, 16] {
        let multi = encode_all(&params, BinCount::Auto, workers);
        assert_eq!(multi, single, "workers={workers}");
        let text = to_interchange_string(&multi);
        assert_eq!(text, reference, "workers={workers}");
        assert_eq!(fingerprint(&text), fingerprint(&reference));
    }
}

#[test]
fn test_encode_all_of_empty_set() {
    let config = encode_all(&ParameterSet::empty(), BinCount::Auto, 4);
    assert!(config.is_empty());
}
