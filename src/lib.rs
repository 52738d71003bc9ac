//! Systolic Array Test Vector Generator
//!
//! Produces the stimulus and golden-reference files for a systolic array
//! matrix-multiply testbench: random operands A and B are packed into
//! fixed-width hex lines, one per simulation time-step, and their exact
//! product is flattened into a single golden line.
//!
//! # Example
//!
//! ```rust
//! use systolic_vectors::{generate, FixedSource, FlowSelection, Matrix, MemorySink, VectorConfig};
//!
//! let config = VectorConfig::new(2, 2, 4, 8, 2).with_flow(FlowSelection::Os);
//! let mut source = FixedSource::new([
//!     Matrix::from_rows(&[vec![1, -1], vec![2, 3]]).unwrap(),
//!     Matrix::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap(),
//! ]);
//! let mut sink = MemorySink::new();
//! generate(&config, &mut source, &mut sink).unwrap();
//! assert_eq!(sink.get("golden_output.hex").unwrap()[0], "0302ff01");
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod generator;
pub mod hexfmt;
pub mod matrix;
pub mod packing;
pub mod sink;

pub use config::{Dataflow, FlowSelection, VectorConfig};
pub use encoder::{
    encode_all, encode_golden, encode_inputs, encode_output_stationary,
    encode_weight_stationary, encode_weights, EncodedVectors, PackedStream,
};
pub use error::{GenError, GenResult};
pub use generator::{generate, generate_to_dir, FileReport, GenerationReport, VectorKind};
pub use hexfmt::{format_hex, hex_digits, parse_hex_line};
pub use matrix::{FixedSource, GoldenMatrix, Matrix, MatrixSource, RandomSource};
pub use packing::{pack, unpack};
pub use sink::{FileSink, MemorySink, VectorSink};
