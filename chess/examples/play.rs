// Simple command-line application to play chess
//
// Moves are entered as a pair of squares, like `e2e4`. Castling is entered as the king move
// (`e1g1`). When a pawn reaches the last rank, the program asks for the piece to promote to.
// Set `RUST_LOG=threatboard=debug` to see what the engine does.

use threatboard::{Color, Coord, Game, MoveError, Movement, Phase, PieceKind, PrettyStyle};

use std::io::{self, BufRead, Write};

use tracing_subscriber::EnvFilter;

fn parse_move(s: &str) -> Option<(Coord, Coord)> {
    if s.len() != 4 || !s.is_ascii() {
        return None;
    }
    let src = s[0..2].parse().ok()?;
    let dst = s[2..4].parse().ok()?;
    Some((src, dst))
}

fn prompt(text: &str) -> io::Result<String> {
    print!("{}", text);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().lock().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut game = Game::new();

    loop {
        if let Some(outcome) = game.outcome() {
            println!("Game finished: {}", outcome);
            let moves: Vec<String> = game.history().iter().map(|r| r.to_string()).collect();
            println!("Moves: {}", moves.join(" "));
            break;
        }

        if let Phase::PromotionPending(_) = game.phase() {
            let s = prompt("Promote to (q, r, b, n): ")?;
            let kind = s
                .chars()
                .next()
                .and_then(PieceKind::from_char)
                .unwrap_or(PieceKind::Pawn);
            if let Err(e) = game.resolve_promotion(kind) {
                println!("Bad choice: {}", e);
            }
            continue;
        }

        println!("{}", game.snapshot().pretty(PrettyStyle::Utf8));
        let side = game.side();
        if game.query_check_state(side).is_check() {
            println!("Check!");
        }
        let s = prompt(&format!("{} move: ", side.name()))?;
        match s.as_str() {
            "" => continue,
            "quit" | "resign" => {
                game.forfeit(side).ok();
                continue;
            }
            _ => {}
        }

        let Some((src, dst)) = parse_move(&s) else {
            println!("Bad move: expected two squares, like e2e4");
            println!();
            continue;
        };
        let Some(kind) = game.board().occupant(src).map(|p| p.kind()) else {
            println!("Bad move: {}", MoveError::NoSuchPiece(src));
            println!();
            continue;
        };

        match game.request_move(kind, side, src, dst) {
            Ok(rec) if rec.is_complete() => println!("{} played {}", side.name(), rec),
            Ok(_) => {}
            Err(e) => println!("Bad move: {}", e),
        }
        if side == Color::Black {
            println!();
        }
    }

    Ok(())
}
