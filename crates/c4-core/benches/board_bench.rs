//! Criterion benchmarks for board placement, win detection and the JSON codec.
//!
//! Run with:
//! ```bash
//! cargo bench --package c4-core --bench board_bench
//! ```

use c4_core::protocol::{decode, encode, ClientMessage, MoveResult, ServerMessage, Winner};
use c4_core::{Board, Side, COLUMNS, ROWS};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// A board with `filled` discs per column, alternating sides, and no win.
fn board_with_height(filled: usize) -> Board {
    let mut board = Board::new();
    for col in 0..COLUMNS as i32 {
        for i in 0..filled {
            // Pairs of columns swap the starting side so rows never line up four.
            let side = if (i + col as usize / 2) % 2 == 0 { Side::Client } else { Side::Server };
            board.place(side, col).unwrap();
        }
    }
    board
}

// ── Benchmarks: board ─────────────────────────────────────────────────────────

fn bench_place_then_undo_by_clone(c: &mut Criterion) {
    let base = Board::new();
    c.bench_function("place_empty_board", |b| {
        b.iter(|| {
            let mut board = base.clone();
            board.place(black_box(Side::Client), black_box(3))
        })
    });
}

fn bench_has_won_by_height(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_won");
    for height in [1usize, 3, ROWS] {
        let board = board_with_height(height);
        group.bench_with_input(BenchmarkId::new("column_height", height), &height, |b, _| {
            b.iter(|| board.has_won(black_box(Side::Client)))
        });
    }
    group.finish();
}

// ── Benchmarks: codec ─────────────────────────────────────────────────────────

fn bench_codec(c: &mut Criterion) {
    let board = board_with_height(3);
    let result = ServerMessage::MoveResult(MoveResult::accepted(false, Winner::None, board.snapshot()));
    let result_text = encode(&result).unwrap();
    let mv_text = encode(&ClientMessage::move_to(4)).unwrap();

    let mut group = c.benchmark_group("codec");
    group.bench_function("encode_move_result", |b| b.iter(|| encode(black_box(&result))));
    group.bench_function("decode_move_result", |b| {
        b.iter(|| decode::<ServerMessage>(black_box(&result_text)))
    });
    group.bench_function("decode_move", |b| {
        b.iter(|| decode::<ClientMessage>(black_box(&mv_text)))
    });
    group.finish();
}

criterion_group!(benches, bench_place_then_undo_by_clone, bench_has_won_by_height, bench_codec);
criterion_main!(benches);
