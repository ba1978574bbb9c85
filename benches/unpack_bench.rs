use criterion::{black_box, criterion_group, criterion_main, Criterion};
use swfnorm::codec::{Codec, ZlibCodec};
use swfnorm::{repack, unpack};

fn container(magic: &[u8; 3], payload: &[u8], body_len: usize) -> Vec<u8> {
    let mut out = magic.to_vec();
    out.push(10);
    out.extend_from_slice(&((body_len + 8) as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

fn bench_unpack(c: &mut Criterion) {
    let body: Vec<u8> = (0u8..=250).cycle().take(1024 * 1024).collect();
    let fws = container(b"FWS", &body, body.len());
    let cws = container(b"CWS", &ZlibCodec.encode(&body).unwrap(), body.len());

    let mut polyglot = fws[..8].to_vec();
    polyglot.extend(vec![0x20u8; 64 * 1024]);
    polyglot.extend_from_slice(&cws);

    c.bench_function("unpack_fws_1mb", |b| b.iter(|| unpack(black_box(&fws[..])).unwrap()));
    c.bench_function("unpack_cws_1mb", |b| b.iter(|| unpack(black_box(&cws[..])).unwrap()));
    c.bench_function("unpack_polyglot_1mb", |b| b.iter(|| unpack(black_box(&polyglot[..])).unwrap()));
}

fn bench_repack(c: &mut Criterion) {
    let body = vec![42u8; 1024 * 1024];
    c.bench_function("repack_1mb", |b| b.iter(|| repack(10, black_box(&body))));
}

criterion_group!(benches, bench_unpack, bench_repack);
criterion_main!(benches);
