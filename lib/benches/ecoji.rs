use criterion::{criterion_group, criterion_main, Criterion};
use ecoji::{Alphabet, Encoding};

fn encoding() -> Encoding {
    let symbols: Vec<u32> = (0x1f000..0x1f400).collect();
    let alphabet = Alphabet::from_codepoints(&symbols, [0x269c, 0x1f400, 0x1f401, 0x1f402]).unwrap();
    Encoding::new(alphabet)
}

fn criterion_benchmark(c: &mut Criterion) {
    let encoding = encoding();
    let data: Vec<u8> = (0..4096_u32).map(|i| (i * 31 % 256) as u8).collect();
    let encoded = encoding.encode(&data);

    c.bench_function("encode", |b| {
        b.iter(|| {
            encoding.encode(&data);
        })
    });

    c.bench_function("encode_into", |b| {
        let mut output = String::with_capacity(encoded.len());
        b.iter(|| {
            output.clear();
            encoding.encode_into(&data, &mut output);
        })
    });

    c.bench_function("decode", |b| {
        b.iter(|| {
            encoding.decode(&encoded).unwrap();
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
