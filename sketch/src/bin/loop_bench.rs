#[cfg(feature = "bench_loops")]
use sketch::model::{polygon_curves, Curve};
#[cfg(feature = "bench_loops")]
use sketch::{LoopBuilder, TopoStore};
#[cfg(feature = "bench_loops")]
use std::time::Instant;

#[cfg(not(feature = "bench_loops"))]
fn main() {
    panic!("loop_bench requires --features bench_loops");
}

#[cfg(feature = "bench_loops")]
fn ngon(n: usize, r: f64) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            (r * a.cos(), r * a.sin())
        })
        .collect()
}

#[cfg(feature = "bench_loops")]
fn main() {
    let args: Vec<String> = std::env::args().collect();
    let mut n = 2_000usize;
    let mut repeats = 20usize;
    for a in &args[1..] {
        if let Some(val) = a.strip_prefix("--n=") {
            if let Ok(v) = val.parse() {
                n = v;
            }
        } else if let Some(val) = a.strip_prefix("--repeats=") {
            if let Ok(v) = val.parse() {
                repeats = v;
            }
        }
    }

    let builder = LoopBuilder::new();
    let mut store = TopoStore::new();
    let base = polygon_curves(&ngon(n, 1_000.0));

    let t0 = Instant::now();
    let lp = builder.create_loop(&mut store, &base);
    let create_ms = t0.elapsed().as_secs_f64() * 1000.0;

    // Worst case for the offset search: the retrace starts half way round
    // and runs backwards.
    let mut retrace = base.clone();
    retrace.rotate_left(n / 2);
    let retrace: Vec<Curve> = retrace.iter().rev().map(Curve::reversed).collect();
    let mut times = Vec::with_capacity(repeats);
    for _ in 0..repeats {
        let t = Instant::now();
        let again = builder.create_or_update_loop(&mut store, Some(lp), &retrace, false);
        times.push(t.elapsed().as_secs_f64() * 1000.0);
        assert_eq!(again, lp, "retrace lost loop identity");
    }
    let avg_update = if times.is_empty() {
        0.0
    } else {
        times.iter().sum::<f64>() / (times.len() as f64)
    };

    println!(
        "curves={} create_ms={:.3} avg_update_ms={:.3} store_version={}",
        n,
        create_ms,
        avg_update,
        store.version()
    );
}
