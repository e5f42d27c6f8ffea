// Drives the compiled binary through a PTY: real event loop, real crossterm
// input, no persistent state.
//
// - Needs a TTY; expectrl allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

fn spawn_app(args: &str) -> Result<expectrl::session::Session, Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("lofitab");
    let cmd = format!("{} --db :memory: --seed 1 {args}", bin.display());
    let p = spawn(cmd)?;
    // alternate screen setup
    std::thread::sleep(Duration::from_millis(200));
    Ok(p)
}

#[test]
#[ignore]
fn quits_from_the_focus_view() -> Result<(), Box<dyn std::error::Error>> {
    let mut p = spawn_app("")?;
    p.send(" ")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}

#[test]
#[ignore]
fn stops_a_running_game_then_quits() -> Result<(), Box<dyn std::error::Error>> {
    let mut p = spawn_app("--view arcade --game snake")?;
    // start, steer, stop
    p.send("\r")?;
    std::thread::sleep(Duration::from_millis(300));
    p.send("\x1b[A")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("\x1b")?;
    std::thread::sleep(Duration::from_millis(100));
    p.send("q")?;
    p.expect(Eof)?;
    Ok(())
}
