//! Benchmarks for graph stepping and glossary lookup.
//!
//! Run with: cargo bench --bench graph_bench

use chatgraph::translate::{format_glossary, match_words_from_glossary, Glossary, GlossaryEntry};
use chatgraph_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn echo_graph(length: usize) -> Graph<MessagesState, Built> {
    let mut graph = Graph::new("echo");
    let names: Vec<String> = (0..length).map(|i| format!("echo_{i}")).collect();
    for name in &names {
        let reply = name.clone();
        graph.add_node(FunctionNode::new(
            name.clone(),
            move |_: Context, _state: MessagesState| {
                let reply = reply.clone();
                async move {
                    Ok(NodeOutput::Updates(vec![MessagesStateUpdate::Messages(vec![
                        Message::ai(reply),
                    ])]))
                }
            },
        ));
    }
    graph.add_edge(START, names[0].clone());
    for pair in names.windows(2) {
        graph.add_edge(pair[0].clone(), pair[1].clone());
    }
    graph.add_edge(names[length - 1].clone(), END);
    graph.recursion_limit(length + 1);
    graph.build().unwrap()
}

fn bench_graph_run(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("graph_run");

    for length in [1, 10, 20] {
        let graph = echo_graph(length);
        let ctx = Context::default();
        group.bench_with_input(BenchmarkId::new("linear", length), &length, |b, _| {
            b.iter(|| {
                let mut state = MessagesState::new();
                state.add_message(Message::human("hi"));
                let out = rt.block_on(graph.run(&ctx, black_box(state))).unwrap();
                black_box(out.messages.len())
            });
        });
    }

    group.finish();
}

fn glossary(size: usize) -> Glossary {
    (0..size)
        .map(|i| (format!("term{i}"), GlossaryEntry::new(format!("termino{i}"), "")))
        .chain([("drink".to_string(), GlossaryEntry::new("beber", "animals"))])
        .collect()
}

fn bench_glossary_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("glossary_match");
    let text = "The fish drink in the river while term7 and term42 float downstream. ".repeat(20);

    for size in [10, 100, 1_000] {
        let glossary = glossary(size);
        group.bench_with_input(BenchmarkId::new("match", size), &size, |b, _| {
            b.iter(|| {
                let found = match_words_from_glossary(black_box(&glossary), black_box(&text));
                black_box(format_glossary(&found))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_graph_run, bench_glossary_match);
criterion_main!(benches);
