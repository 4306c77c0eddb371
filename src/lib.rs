//! This crate maintains an ordered sequence of 64-bit signed integers and supports range sum, range assignment, range addition, positional insertion and removal, and in-place next/prev permutation steps on any contiguous sub-range. See the trait [Sequence].
//!
//! Every operation takes expected O(lg n) time. The sequence is stored in a treap keyed implicitly by in-order position, with lazy propagation of add, assign and reverse tags and incrementally maintained sorted-run flags; the flags are what let the permutation steps locate their pivot without scanning the range.
//!
//! ## Usage
//!
//! Create an engine with [Sequence::from_values] (or [Sequence::new] for an empty one) and use the methods on [Sequence] to query and rearrange it.
//!
//! ```
//! use permseq::{Sequence, TreapSeq};
//!
//! let mut seq = TreapSeq::from_values([1, 2, 3, 4, 5]);
//! assert_eq!(seq.sum(1, 3), 9);
//! seq.next_permutation(0, 4);
//! assert_eq!(seq.extract(), vec![1, 2, 3, 5, 4]);
//! ```
//!
//! The `solve` binary (run it with `cargo run`) reads the textual command stream described in [commands] from stdin and writes the answers to stdout.
//!
//! ## Implementation
//!
//! - Engine: see `impl Sequence for TreapSeq` in `src/seq/treap.rs`.
//! - Command stream: see [commands::Program] and [commands::run] in `src/commands.rs`.
//!
//! ## Testing
//!
//! Run the tests using:
//!
//! ```skip
//! cargo test
//! ```
//!
//! Add `-- --ignored` to run the stress test (which runs indefinitely with random data until it fails). And use `cargo bench` to see the benchmarks.
pub mod commands;
pub mod seq;

pub use seq::{treap::TreapSeq, Sequence};
