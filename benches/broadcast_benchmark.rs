use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use signalhub::signaling::{ConnectionId, Envelope, OutboundMessage, Registry};

const OFFER: &str = r#"{"msgtype":"offer","value":"v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n"}"#;

/// decode + canonical re-encode benchmark
fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("Envelope");
    group.throughput(Throughput::Elements(1));

    group.bench_function("decode_encode", |b| {
        b.iter(|| {
            let envelope = Envelope::decode(black_box(OFFER)).unwrap();
            black_box(envelope.encode().unwrap())
        })
    });

    group.finish();
}

/// fan-out to N receivers, draining queues between iterations
fn bench_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("Fanout");

    for receivers in [10usize, 100, 1000] {
        let mut registry = Registry::new();
        let mut queues = Vec::with_capacity(receivers);
        for _ in 0..receivers {
            let (tx, rx) = async_channel::bounded::<OutboundMessage>(256);
            registry.register(ConnectionId::generate(), tx);
            queues.push(rx);
        }
        let sender = ConnectionId::generate();
        let (sender_tx, _sender_rx) = async_channel::bounded::<OutboundMessage>(1);
        registry.register(sender, sender_tx);
        let message = OutboundMessage::from(OFFER);

        group.throughput(Throughput::Elements(receivers as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(receivers),
            &receivers,
            |b, _| {
                b.iter(|| {
                    let outcome = registry.broadcast(black_box(&message), sender);
                    for rx in &queues {
                        let _ = rx.try_recv();
                    }
                    black_box(outcome)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_envelope, bench_fanout);
criterion_main!(benches);
