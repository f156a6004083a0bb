use criterion::{criterion_group, criterion_main, Criterion};

use keyprotect::provider::DefaultProvider;
use keyprotect::{protect, unprotect};

const CLEAR: &[u8] =
    b"(11:private-key(3:rsa(1:n3:\x01\x00\x01)(1:e1:\x03)(1:d1:\x07)(1:p1:\x05)(1:q1:\x0b)(1:u1:\x02)))";

pub fn criterion_benchmark(c: &mut Criterion) {
    let provider = DefaultProvider;
    let protected = protect(CLEAR, b"hunter2", &provider).unwrap();

    c.bench_function("protect", |b| b.iter(|| protect(CLEAR, b"hunter2", &provider)));
    c.bench_function("unprotect", |b| b.iter(|| unprotect(&protected, b"hunter2", &provider)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
