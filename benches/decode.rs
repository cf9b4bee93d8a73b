use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sdtd_monitor::core::{build_snapshot, classify, decode_memory, decode_roster, PollReplies};
use sdtd_monitor::types::ConsoleCommand;

fn roster_reply(players: usize) -> String {
    let mut raw = String::from(
        "2025-12-10T10:35:08 1991.171 INF Executing command 'lp' by Telnet from 127.0.0.1:5431\r\n",
    );
    for i in 0..players {
        raw.push_str(&format!(
            "{n}. id={id}, Player{i}, pos=(-1050.5, 65.0, 890.3), rot=(0.0, -135.0, 0.0), remote=True, \
             health=150, deaths=2, zombies={i}, players=0, score=15, level=13, \
             steamid=7656119801234{i:04}, ip=10.0.0.{ip}, ping={ping}\r\n",
            n = i + 1,
            id = 171 + i,
            ip = i % 250,
            ping = 20 + i % 80,
        ));
        if i % 4 == 0 {
            raw.push_str("2025-12-10T10:35:09 1992.004 INF Chat (from 'Steam_1', entity id '172', to 'Global'): 'x': hi\r\n");
        }
    }
    raw.push_str(&format!("Total of {players} in the game\r\n"));
    raw
}

const MEM_REPLY: &str = "2025-12-10T10:35:08 1991.171 INF Executing command 'mem' by Telnet\r\n\
    Time: 1991.17m FPS: 58.4 Heap: 2500.5MB Max: 3500.0MB Chunks: 312 CGO: 44 Ply: 3 Zom: 12 Ent: 41 (97) Items: 5\r\n";

fn bench_classify(c: &mut Criterion) {
    let raw = roster_reply(64);
    c.bench_function("classify_roster_64", |b| {
        b.iter(|| classify(black_box(&raw)))
    });
}

fn bench_decode(c: &mut Criterion) {
    let body = classify(&roster_reply(64)).body_text();
    c.bench_function("decode_roster_64", |b| {
        b.iter(|| decode_roster(black_box(&body)))
    });

    let mem = classify(MEM_REPLY).body_text();
    c.bench_function("decode_memory", |b| {
        b.iter(|| decode_memory(black_box(&mem)))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut replies = PollReplies::default();
    replies.set(ConsoleCommand::Time, "Day 7, 21:45".into());
    replies.set(ConsoleCommand::Memory, classify(MEM_REPLY).body_text());
    replies.set(ConsoleCommand::Roster, classify(&roster_reply(32)).body_text());
    replies.set(
        ConsoleCommand::Entities,
        "1. id=801, type=Zombie\n2. id=804, type=Animal\n".into(),
    );

    c.bench_function("build_snapshot_32", |b| {
        b.iter(|| build_snapshot("localhost", 8081, black_box(&replies)))
    });
}

criterion_group!(benches, bench_classify, bench_decode, bench_snapshot);
criterion_main!(benches);
