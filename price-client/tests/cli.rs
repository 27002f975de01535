use assert_cmd::Command;
use predicates::prelude::*;
use std::net::TcpListener;

#[test]
fn help_mentions_server_flag() {
    Command::cargo_bin("price-client")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--server"));
}

#[test]
fn missing_server_fails() {
    Command::cargo_bin("price-client")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("--server"));
}

#[test]
fn server_without_port_is_rejected() {
    Command::cargo_bin("price-client")
        .unwrap()
        .args(["--server", "localhost", "--query", "/rate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("HOST:PORT"));
}

#[test]
fn unknown_command_is_rejected_before_connecting() {
    // порт заведомо свободен: сюда никто не слушает
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    Command::cargo_bin("price-client")
        .unwrap()
        .args(["--server", &addr.to_string(), "--query", "/price"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("/price"));
}

#[test]
fn interactive_mode_prints_request_failures() {
    let addr = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    Command::cargo_bin("price-client")
        .unwrap()
        .args(["--server", &addr.to_string()])
        .write_stdin("/rate\n/price\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("❌ io error"))
        .stdout(predicate::str::contains("unknown command: /price"));
}
