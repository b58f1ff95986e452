use bencher::{TestCase, TestFile};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nano_http::codec::RequestDecoder;
use std::hint::black_box;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

static SMALL_HEADER: TestFile = TestFile::new("get_small.txt", include_str!("../resources/request/get_small.txt"));
static LARGE_HEADER: TestFile = TestFile::new("get_large.txt", include_str!("../resources/request/get_large.txt"));
static POST_BODY: TestFile = TestFile::new("post_body.txt", include_str!("../resources/request/post_body.txt"));

fn create_test_cases() -> Vec<TestCase> {
    vec![
        TestCase::new("small_header_decoder", SMALL_HEADER),
        TestCase::new("large_header_decoder", LARGE_HEADER),
        TestCase::new("body_decoder", POST_BODY),
    ]
}

fn benchmark_request_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_decoder");

    for case in create_test_cases() {
        group.throughput(Throughput::Bytes(case.file().content().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut request_decoder = RequestDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(case.file().content()),
                |bytes_mut| {
                    let request = request_decoder
                        .decode(bytes_mut)
                        .unwrap_or_else(|e| panic!("{} should be a valid request: {e}", case.file().file_name()));
                    black_box(request.expect("fixture holds a whole request"));
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(decoder, benchmark_request_decoder);
criterion_main!(decoder);
