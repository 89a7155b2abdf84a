//! Criterion benchmarks for frame reassembly throughput.
//!
//! Covers in-order delivery, reversed fragment order, and delivery where
//! every fragment arrives twice, across small and large frames.

use std::{hint::black_box, num::NonZeroUsize};

use criterion::{BenchmarkId, Criterion, Throughput};
use snapwire::{fragmenter::Fragmenter, reassembler::Reassembler};

const DATAGRAM_CAP: usize = 1_400;
const FRAME_SIZES: [(&str, usize); 2] = [("small", 16 * 1024), ("large", 512 * 1024)];

#[derive(Clone, Copy)]
enum Delivery {
    InOrder,
    Reversed,
    Duplicated,
}

impl Delivery {
    const ALL: [Self; 3] = [Self::InOrder, Self::Reversed, Self::Duplicated];

    const fn label(self) -> &'static str {
        match self {
            Self::InOrder => "in_order",
            Self::Reversed => "reversed",
            Self::Duplicated => "duplicated",
        }
    }

    fn schedule(self, datagrams: &[Vec<u8>]) -> Vec<Vec<u8>> {
        let Some((header, fragments)) = datagrams.split_first() else {
            return Vec::new();
        };
        let mut ordered = vec![header.clone()];
        match self {
            Self::InOrder => ordered.extend_from_slice(fragments),
            Self::Reversed => ordered.extend(fragments.iter().rev().cloned()),
            Self::Duplicated => {
                for fragment in fragments {
                    ordered.push(fragment.clone());
                    ordered.push(fragment.clone());
                }
            }
        }
        ordered
    }
}

fn datagrams_for(len: usize) -> Vec<Vec<u8>> {
    let cap = NonZeroUsize::new(DATAGRAM_CAP).unwrap_or_else(|| panic!("cap is non-zero"));
    let frame: Vec<u8> = (0..=u8::MAX).cycle().take(len).collect();
    match Fragmenter::new(cap).and_then(|f| f.fragment(&frame)) {
        Ok(batch) => batch.datagrams().to_vec(),
        Err(err) => panic!("benchmark setup failed: {err}"),
    }
}

fn benchmark_reassembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("reassembly");

    for (size_label, len) in FRAME_SIZES {
        let datagrams = datagrams_for(len);
        group.throughput(Throughput::Bytes(len as u64));
        for delivery in Delivery::ALL {
            let schedule = delivery.schedule(&datagrams);
            group.bench_function(BenchmarkId::new(delivery.label(), size_label), |b| {
                let mut reassembler = Reassembler::new();
                b.iter(|| {
                    for datagram in &schedule {
                        if let Some(frame) = reassembler.feed(black_box(datagram)) {
                            black_box(frame.len());
                        }
                    }
                });
            });
        }
    }

    group.finish();
}

/// Entrypoint for reassembly benchmarks.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    benchmark_reassembly(&mut criterion);
    criterion.final_summary();
}
