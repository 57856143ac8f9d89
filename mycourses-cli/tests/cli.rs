//! Runs the `mycourses` binary and checks what the operator sees.

use std::{fs, path::Path, thread};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tiny_http::{Response, Server};

fn serve(body: &'static str) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    thread::spawn(move || {
        for request in server.incoming_requests() {
            let _ = request.respond(Response::from_string(body));
        }
    });

    format!("http://{addr}/calendar/export_execute.php?authtoken=x")
}

/// The binary, run inside `dir` with every path pointing there.
fn mycourses(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mycourses"));
    cmd.current_dir(dir)
        .env_remove("RUST_LOG")
        .args(["--config", "config.json"])
        .args(["--feed-url-file", "calendar_feed_url.txt"])
        .args(["--debug-file", "debug_calendar.ics"])
        .args(["--timezone", "UTC"]);
    cmd
}

fn write_feed_url(dir: &TempDir, url: &str) {
    fs::write(dir.path().join("calendar_feed_url.txt"), url).unwrap();
}

#[test]
fn calendar_success_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_feed_url(
        &dir,
        &serve(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n\
             BEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Lecture 5\r\nDTSTART:20241118T100000Z\r\nEND:VEVENT\r\n\
             END:VCALENDAR\r\n",
        ),
    );

    mycourses(dir.path())
        .arg("calendar")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("CALENDAR EVENTS"))
        .stdout(predicate::str::contains("Found 1 event(s)"))
        .stdout(predicate::str::contains("Mon Nov 18, 2024 10:00"));
}

#[test]
fn missing_feed_url_file_exits_one_with_instructions() {
    let dir = tempfile::tempdir().unwrap();

    mycourses(dir.path())
        .arg("calendar")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("❌ Error: configuration error"))
        .stderr(predicate::str::contains("Export calendar"));
}

#[test]
fn unparseable_feed_exits_one_and_keeps_payload() {
    let body = "<html><body>Invalid authentication token</body></html>";
    let dir = tempfile::tempdir().unwrap();
    write_feed_url(&dir, &serve(body));

    mycourses(dir.path())
        .arg("calendar")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not parse calendar data"))
        .stderr(predicate::str::contains("Raw ICS data saved to debug_calendar.ics"));

    assert_eq!(
        fs::read_to_string(dir.path().join("debug_calendar.ics")).unwrap(),
        body
    );
}

#[test]
fn scrape_without_cookie_and_prompting_exits_one() {
    let dir = tempfile::tempdir().unwrap();

    mycourses(dir.path())
        .args(["scrape", "--no-prompt"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no MoodleSession stored"))
        .stderr(predicate::str::contains("without --no-prompt"));

    assert!(!dir.path().join("config.json").exists());
}
