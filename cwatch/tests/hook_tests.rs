//! Forwarder tests: the hook must never fail or emit output, and a live
//! daemon socket must receive the payload verbatim.

use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn run_hook(socket: &str, input: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_cwatch"))
        .args(["hook", "--socket", socket])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start cwatch hook");

    {
        let stdin = child.stdin.as_mut().expect("failed to open stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write hook input");
    }

    child.wait_with_output().expect("failed to read hook output")
}

#[test]
fn test_hook_swallows_garbage_input() {
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("no-daemon.sock");

    let output = run_hook(socket.to_str().unwrap(), "this is not json");
    assert!(output.status.success(), "hook must never fail");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().is_empty(), "expected empty output, got: {stdout}");
}

#[test]
fn test_hook_succeeds_with_unreachable_daemon() {
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("no-daemon.sock");

    let input = r#"{"hook_event_name":"Stop","session_id":"abc"}"#;
    let output = run_hook(socket.to_str().unwrap(), input);

    assert!(output.status.success(), "hook must never fail");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().is_empty(), "expected empty output, got: {stdout}");
}

#[test]
fn test_hook_succeeds_on_empty_input() {
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("no-daemon.sock");

    let output = run_hook(socket.to_str().unwrap(), "");
    assert!(output.status.success());
}

#[test]
fn test_hook_forwards_payload_verbatim() {
    let tmp = TempDir::new().unwrap();
    let socket = tmp.path().join("daemon.sock");
    let listener = UnixListener::bind(&socket).unwrap();

    let reader = std::thread::spawn(move || {
        let (mut stream, _addr) = listener.accept().unwrap();
        let mut received = Vec::new();
        stream.read_to_end(&mut received).unwrap();
        received
    });

    let input = r#"{"hook_event_name":"Notification","message":"needs permission"}"#;
    let output = run_hook(socket.to_str().unwrap(), input);
    assert!(output.status.success());

    let received = reader.join().unwrap();
    assert_eq!(String::from_utf8_lossy(&received), input);
}
