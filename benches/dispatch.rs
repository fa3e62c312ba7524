//! Dispatch Benchmark for chatcmd
//!
//! Measures tokenization and end-to-end dispatch for the common message
//! shapes a bot sees: chatter, plain commands and subcommands.

use async_trait::async_trait;
use chatcmd::commands::builtin::{register_builtins, TagStore};
use chatcmd::commands::MemoryRegistry;
use chatcmd::config::Prefix;
use chatcmd::dispatch::{DeliveryError, Dispatcher, Responder};
use chatcmd::message::{Author, ChannelId, Message};
use chatcmd::tokenizer;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

/// Drops every response.
struct NullResponder;

#[async_trait]
impl Responder for NullResponder {
    async fn send(&self, _channel: &ChannelId, _text: &str) -> Result<(), DeliveryError> {
        Ok(())
    }
}

fn dispatcher() -> Dispatcher {
    let prefix = Prefix::default();
    let tags = Arc::new(TagStore::new());
    tags.set("motd", "be nice");

    let mut registry = MemoryRegistry::new();
    register_builtins(&mut registry, &prefix, tags);

    Dispatcher::new(prefix, Arc::new(registry), Arc::new(NullResponder))
}

fn message(content: &str) -> Message {
    let author = Author::new("1", "bench").with_permission("manage_tags");
    Message::new(content, ChannelId::new("bench"), author)
}

/// Benchmark tokenization
fn bench_tokenize(c: &mut Criterion) {
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Elements(1));

    group.bench_function("plain", |b| {
        b.iter(|| black_box(tokenizer::split(black_box(".echo hello there world"))));
    });

    group.bench_function("quoted", |b| {
        b.iter(|| {
            black_box(tokenizer::split(black_box(
                r#".tag set greeting "hello there" 'general kenobi'"#,
            )))
        });
    });

    group.bench_function("fallback", |b| {
        b.iter(|| black_box(tokenizer::split(black_box(r#".echo "unterminated quote"#))));
    });

    group.finish();
}

/// Benchmark full dispatch
fn bench_dispatch(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("failed to build runtime");
    let dispatcher = dispatcher();

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    for (name, content) in [
        ("ignored", "just chatting about things"),
        ("unknown", ".nosuchcommand with args"),
        ("leaf", ".echo hello there"),
        ("subcommand", ".tag list"),
        ("default_subcommand", ".tag motd"),
        ("rate_limited", ".sum 1 2 3 4 5"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let outcome = runtime.block_on(dispatcher.handle_message(message(content)));
                black_box(outcome.ok());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_tokenize, bench_dispatch);
criterion_main!(benches);
