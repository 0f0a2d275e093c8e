mod common;

use common::random_samples;
use comm_empirical::{
    encode, encode_all, fingerprint, parse_config, read_config, to_interchange_string, write_config, BinCount,
    EncodedConfig, Error, Parameter, ParameterSet, FILE_HEADER,
};

fn two_param_config() -> EncodedConfig {
    let params = ParameterSet::from_fn(|p| match p {
        Parameter::NOwned => vec![10, 20],
        Parameter::CommPartners => vec![3, 3, 3],
        _ => vec![],
    });
    encode_all(&params, BinCount::Fixed(2), 2)
}

#[test]
fn test_serialized_layout() {
    let text = to_interchange_string(&two_param_config());
    let expected = format!(
        "{FILE_HEADER}\
PARAM: nowned
BIN_COUNT: 2
MIN: 10
MAX: 20
MEAN: 15
STDEV: 7
10, 15, 0.50000000000000000000, 10, 0
15, 20, 0.50000000000000000000, 20, 0

PARAM: comm_partners
BIN_COUNT: 1
MIN: 3
MAX: 3
MEAN: 3
STDEV: 0
3, 3, 1.00000000000000000000, 3, 0

"
    );
    assert_eq!(text, expected);
    assert!(text.starts_with("BENCHMARK INPUT FILE\nFORMAT IS ORDERED AS FOLLOWS:\n"));
}

#[test]
fn test_proportions_keep_full_precision() {
    let dist = encode(Parameter::NOwned, &[1, 2, 3], BinCount::Fixed(1)).expect("nonempty");
    let line = dist.bins[0].to_string();
    assert_eq!(line, "1, 3, 1.00000000000000000000, 2, 1");

    let dist = encode(Parameter::NOwned, &[1, 5, 9], BinCount::Fixed(2)).expect("nonempty");
    let prop_field = dist.bins[0].to_string().split(", ").nth(2).expect("field").to_owned();
    let decimals = prop_field.split('.').nth(1).expect("decimals");
    assert!(decimals.len() >= 20, "{prop_field}");
    assert_eq!(prop_field.parse::<f64>().expect("float"), 1.0 / 3.0);
}

#[test]
fn test_parse_recovers_written_config() {
    let params = ParameterSet::from_fn(|p| match p {
        Parameter::NOwned => random_samples(11, 2000, 1, 90_000),
        Parameter::Stride => random_samples(12, 1500, -40, 40),
        Parameter::UpdatesPerSetup => vec![0, 2, 2, 5],
        _ => vec![],
    });
    let config = encode_all(&params, BinCount::Fixed(13), 3);
    let parsed = parse_config(&to_interchange_string(&config)).expect("parse");
    assert_eq!(parsed, config);
}

#[test]
fn test_write_and_read_file() {
    let dir = std::env::temp_dir().join(format!("comm_empirical_interchange_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    let path = dir.join("benchmark_config.txt");

    let config = two_param_config();
    let fp = write_config(&path, &config).expect("write");
    let text = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(fp, fingerprint(&text));
    assert_eq!(read_config(&path).expect("read"), config);

    std::fs::remove_dir_all(&dir).expect("cleanup");
}

#[test]
fn test_fingerprint_is_short_and_sensitive() {
    let a = fingerprint("PARAM: nowned\n");
    let b = fingerprint("PARAM: nremote\n");
    assert_eq!(a.len(), 12);
    assert_ne!(a, b);
    assert_eq!(a, fingerprint("PARAM: nowned\n"));
}

#[test]
fn test_header_only_file_is_empty_config() {
    let config = parse_config(FILE_HEADER).expect("parse");
    assert!(config.is_empty());
}

#[test]
fn test_truncated_block_is_an_error() {
    let text = "PARAM: nowned\nBIN_COUNT: 2\nMIN: 1\nMAX: 9\nMEAN: 5\nSTDEV: 2\n1, 5, 0.5, 3, 1\n";
    match parse_config(text) {
        Err(Error::Interchange { line, .. }) => assert_eq!(line, 8),
        other => panic!("expected interchange error, got {other:?}"),
    }
}

#[test]
fn test_unknown_header_key_is_an_error() {
    let text = "PARAM: stride\nBIN_COUNT: 1\nMIN: 1\nMEDIAN: 1\nMEAN: 1\nSTDEV: 0\n1, 1, 1.0, 1, 0\n";
    match parse_config(text) {
        Err(Error::Interchange { line, reason }) => {
            assert_eq!(line, 4);
            assert!(reason.contains("MEDIAN"), "{reason}");
        }
        other => panic!("expected interchange error, got {other:?}"),
    }
}

#[test]
fn test_malformed_bin_line_is_an_error() {
    let text = "PARAM: stride\nBIN_COUNT: 1\nMIN: 1\nMAX: 2\nMEAN: 1\nSTDEV: 0\n1, 2, half, 1, 0\n";
    assert!(matches!(parse_config(text), Err(Error::Interchange { line: 7, .. })));
}
