//! End-to-end checks on written vector files

use num_bigint::BigInt;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;
use std::path::Path;

use systolic_vectors::packing::unpack_i64;
use systolic_vectors::{
    generate, generate_to_dir, parse_hex_line, unpack, FixedSource, FlowSelection, Matrix,
    MatrixSource, MemorySink, RandomSource, VectorConfig,
};

fn read_lines(dir: &Path, name: &str) -> Vec<String> {
    fs::read_to_string(dir.join(name))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn os_input_has_one_line_per_k() {
    let dir = tempfile::tempdir().unwrap();
    let config = VectorConfig::new(3, 5, 6, 16, 7)
        .with_seed(11)
        .with_flow(FlowSelection::Os);
    generate_to_dir(&config, dir.path()).unwrap();

    let lines = read_lines(dir.path(), "input_matrix.hex");
    assert_eq!(lines.len(), 7);
    // 3 lanes x 6 bits = 18 bits -> 5 hex digits
    assert!(lines.iter().all(|l| l.len() == 5));

    let weights = read_lines(dir.path(), "weight_matrix.hex");
    assert_eq!(weights.len(), 7);
    assert!(weights.iter().all(|l| l.len() == 8)); // 30 bits

    let golden = read_lines(dir.path(), "golden_output.hex");
    assert_eq!(golden.len(), 1);
    assert_eq!(golden[0].len(), 60); // 15 lanes x 16 bits
}

#[test]
fn ws_input_pads_final_block() {
    let dir = tempfile::tempdir().unwrap();
    let config = VectorConfig::new(4, 2, 8, 32, 5)
        .with_seed(3)
        .with_flow(FlowSelection::Ws);
    generate_to_dir(&config, dir.path()).unwrap();

    let lines = read_lines(dir.path(), "input_matrix.hex");
    assert_eq!(lines.len(), 8);

    // Regenerate A from the same seed to compare against
    let mut source = RandomSource::seeded(3);
    let a = source.matrix(4, 5, -128, 127).unwrap();

    for (idx, line) in lines.iter().enumerate() {
        let word = parse_hex_line(line).unwrap();
        let lanes = unpack_i64(&word, 4, 8).unwrap();
        let (block, m) = (idx / 4, idx % 4);
        for (i, lane) in lanes.iter().enumerate() {
            let kk = block * 4 + i;
            let expected = if kk < 5 { a.get(m, kk) } else { 0 };
            assert_eq!(*lane, expected, "line {} lane {}", idx, i);
        }
    }
}

#[test]
fn both_flows_write_suffixed_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = VectorConfig::new(4, 4, 8, 32, 6)
        .with_seed(5)
        .with_flow(FlowSelection::Both);
    let report = generate_to_dir(&config, dir.path()).unwrap();

    assert_eq!(read_lines(dir.path(), "input_matrix_os.hex").len(), 6);
    assert_eq!(read_lines(dir.path(), "input_matrix_ws.hex").len(), 8);
    assert!(!dir.path().join("input_matrix.hex").exists());
    assert_eq!(report.files.len(), 4);
}

#[test]
fn fixed_seed_is_byte_identical() {
    let config = VectorConfig::new(8, 6, 8, 32, 20)
        .with_seed(1234)
        .with_flow(FlowSelection::Both);
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let report = generate_to_dir(&config, first.path()).unwrap();
    generate_to_dir(&config, second.path()).unwrap();

    for name in report.file_names() {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

#[test]
fn golden_wraps_instead_of_failing() {
    // 127 * 127 * 4 needs 17 bits; an 8-bit output lane keeps the low byte
    let a = Matrix::from_rows(&[vec![127; 4]]).unwrap();
    let b = Matrix::from_rows(&[vec![127], vec![127], vec![127], vec![127]]).unwrap();
    let config = VectorConfig::new(1, 1, 8, 8, 4).with_flow(FlowSelection::Os);
    let mut sink = MemorySink::new();
    generate(&config, &mut FixedSource::new([a, b]), &mut sink).unwrap();

    let expected = (127i64 * 127 * 4) & 0xff;
    assert_eq!(
        sink.get("golden_output.hex").unwrap(),
        &[format!("{:02x}", expected)]
    );
}

#[test]
fn unconfigured_flow_string_is_rejected() {
    assert!("xs".parse::<FlowSelection>().is_err());
    assert!(serde_json::from_str::<VectorConfig>(r#"{"flow": "xs"}"#).is_err());
}

fn small_config() -> impl Strategy<Value = (VectorConfig, u64)> {
    (1usize..6, 1usize..6, 2usize..10, 1usize..12, any::<u64>()).prop_map(
        |(rows, cols, ip_width, k_dim, seed)| {
            // op_width intentionally narrower than the exact width half the time
            let op_width = ip_width + (seed as usize % (ip_width + 8));
            (
                VectorConfig::new(rows, cols, ip_width, op_width, k_dim)
                    .with_flow(FlowSelection::Both),
                seed,
            )
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The golden line, reshaped row-major and sign-interpreted, equals
    /// A @ B modulo 2^op_width.
    #[test]
    fn golden_matches_product_modulo_width((config, seed) in small_config()) {
        let mut source = RandomSource::seeded(seed);
        let a = source.matrix(config.rows, config.k_dim, config.min_value(), config.max_value()).unwrap();
        let b = source.matrix(config.k_dim, config.cols, config.min_value(), config.max_value()).unwrap();

        let mut sink = MemorySink::new();
        generate(&config, &mut FixedSource::new([a.clone(), b.clone()]), &mut sink).unwrap();

        let golden = sink.get("golden_output.hex").unwrap();
        prop_assert_eq!(golden.len(), 1);
        prop_assert_eq!(golden[0].len(), config.golden_hex_digits());

        let word = parse_hex_line(&golden[0]).unwrap();
        let lanes = unpack(&word, config.rows * config.cols, config.op_width);
        let modulus = BigInt::from(1) << config.op_width;
        let half = BigInt::from(1) << (config.op_width - 1);

        for i in 0..config.rows {
            for j in 0..config.cols {
                let exact: i64 = (0..config.k_dim).map(|k| a.get(i, k) * b.get(k, j)).sum();
                let mut wrapped = ((BigInt::from(exact) % &modulus) + &modulus) % &modulus;
                if wrapped >= half {
                    wrapped -= &modulus;
                }
                prop_assert_eq!(&lanes[i * config.cols + j], &wrapped);
            }
        }
    }

    /// Every input and weight line decodes back to the operand it came from.
    #[test]
    fn os_and_weight_lines_round_trip((config, seed) in small_config()) {
        let mut source = RandomSource::seeded(seed);
        let a = source.matrix(config.rows, config.k_dim, config.min_value(), config.max_value()).unwrap();
        let b = source.matrix(config.k_dim, config.cols, config.min_value(), config.max_value()).unwrap();

        let mut sink = MemorySink::new();
        generate(&config, &mut FixedSource::new([a.clone(), b.clone()]), &mut sink).unwrap();

        let inputs = sink.get("input_matrix_os.hex").unwrap();
        let weights = sink.get("weight_matrix.hex").unwrap();
        prop_assert_eq!(inputs.len(), config.k_dim);
        prop_assert_eq!(weights.len(), config.k_dim);

        for k in 0..config.k_dim {
            prop_assert_eq!(inputs[k].len(), config.input_hex_digits());
            let column = unpack_i64(&parse_hex_line(&inputs[k]).unwrap(), config.rows, config.ip_width).unwrap();
            prop_assert_eq!(column, a.column(k).collect::<Vec<_>>());

            let row = unpack_i64(&parse_hex_line(&weights[k]).unwrap(), config.cols, config.ip_width).unwrap();
            prop_assert_eq!(row.as_slice(), b.row(k));
        }
    }
}
