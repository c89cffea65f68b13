//! Interactive loop driven through stdin

mod support;

use predicates::prelude::*;
use support::{agent_builder, agent_builder_process, fake_model, local_model_args};
use tempfile::TempDir;

/// Interactive session against a local model that is never called
fn session(temp: &TempDir, stdin: &str) -> assert_cmd::assert::Assert {
    agent_builder(temp.path())
        .args(local_model_args("http://127.0.0.1:9/v1"))
        .write_stdin(stdin)
        .assert()
}

#[test]
fn test_exit_shows_welcome_and_goodbye() {
    let temp = TempDir::new().unwrap();
    session(&temp, "exit\n")
        .success()
        .stdout(predicate::str::contains("Welcome to agent-builder"))
        .stdout(predicate::str::contains("~ "))
        .stdout(predicate::str::contains("Goodbye! Session ended."));
}

#[test]
fn test_quit_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    session(&temp, "  QUIT \nthis is never sent\n")
        .success()
        .stdout(predicate::str::contains("Goodbye! Session ended."));
}

#[test]
fn test_end_of_input_ends_session() {
    let temp = TempDir::new().unwrap();
    session(&temp, "")
        .success()
        .stdout(predicate::str::contains("Goodbye! Session ended."));
}

#[test]
fn test_stored_welcome_text_is_shown() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("data")).unwrap();
    std::fs::write(temp.path().join("data").join("welcome.md"), "Project Falcon workspace").unwrap();

    session(&temp, "exit\n")
        .success()
        .stdout(predicate::str::contains("Project Falcon workspace"));
}

#[test]
fn test_shell_shortcut() {
    let temp = TempDir::new().unwrap();
    session(&temp, "!echo hello-from-shell\nexit\n")
        .success()
        .stdout(predicate::str::contains("$ echo hello-from-shell"))
        .stdout(predicate::str::contains("hello-from-shell\n"));
}

#[test]
fn test_python_shortcut() {
    if which::which("python3").is_err() && which::which("python").is_err() {
        return;
    }
    let temp = TempDir::new().unwrap();
    session(&temp, ">print(6 * 7)\nexit\n")
        .success()
        .stdout(predicate::str::contains("42"));
}

#[test]
fn test_model_error_keeps_loop_running() {
    let temp = TempDir::new().unwrap();
    // Nothing listens on port 9, so the query fails and the loop continues
    session(&temp, "hello\n!echo still-running\nexit\n")
        .success()
        .stdout(predicate::str::contains("Error: Model error"))
        .stdout(predicate::str::contains("still-running"));
}

#[test]
fn test_query_answer_is_printed() {
    let temp = TempDir::new().unwrap();
    let url = fake_model(&["Hello from the model."]);

    agent_builder(temp.path())
        .args(local_model_args(&url))
        .write_stdin("hi there\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello from the model."));
}

#[cfg(unix)]
#[test]
fn test_interrupt_during_turn_ends_session() {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::process::Stdio;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    let temp = TempDir::new().unwrap();

    // Accepts the model request and never answers it
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/v1", listener.local_addr().unwrap());
    let (connected, accepted) = mpsc::channel();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            connected.send(stream).ok();
        }
    });

    let mut child = agent_builder_process(temp.path())
        .args(local_model_args(&url))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"hello\n").unwrap();

    let _held = accepted
        .recv_timeout(Duration::from_secs(10))
        .expect("the turn should reach the model");

    let status = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(exit) = child.try_wait().unwrap() {
            break exit;
        }
        if Instant::now() > deadline {
            child.kill().ok();
            panic!("session kept running after SIGINT");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    let mut stdout = String::new();
    child.stdout.take().unwrap().read_to_string(&mut stdout).unwrap();
    assert!(exit.success());
    assert!(stdout.contains("Goodbye! Session ended."));
    drop(stdin);
}
