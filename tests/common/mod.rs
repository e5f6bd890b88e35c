use assert_cmd::Command;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::process::Command as StdCommand;
use tempfile::TempDir;

pub fn git_available() -> bool {
    StdCommand::new("git").arg("--version").output().is_ok()
}

/// Scratch repository: a tagged release followed by one commit.
pub struct TestRepo {
    tmp: TempDir,
}

impl TestRepo {
    pub fn new(codeowners: &str, changed: &[&str], subject: &str) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path();

        git(root, &["init", "-q"]);
        git(root, &["config", "user.name", "Tester"]);
        git(root, &["config", "user.email", "tester@example.com"]);
        git(root, &["config", "commit.gpgsign", "false"]);

        write(root, ".github/CODEOWNERS", codeowners);
        write(root, "README.md", "release");
        git(root, &["add", "-A"]);
        git(root, &["commit", "-q", "-m", "release"]);
        git(root, &["tag", "v1.0.0"]);

        for path in changed {
            write(root, path, "changed");
        }
        git(root, &["add", "-A"]);
        git(root, &["commit", "-q", "-m", subject]);

        Self { tmp }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }
}

fn write(root: &Path, rel: &str, contents: &str) {
    let full = root.join(rel);
    fs::create_dir_all(full.parent().expect("parent dir")).expect("create dirs");
    fs::write(full, contents).expect("write file");
}

fn git(root: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .status()
        .expect("run git");
    assert!(status.success(), "git {args:?} failed");
}

/// Minimal stand-in for the code-hosting API. Serves until the test process
/// exits.
pub struct FakeApi {
    pub url: String,
}

impl FakeApi {
    pub fn start(author: Option<&str>, approvers: &[&str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake api");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));

        let commit = match author {
            Some(login) => ("200 OK", serde_json::json!({ "author": { "login": login } })),
            None => ("404 Not Found", serde_json::json!({ "message": "Not Found" })),
        };
        let reviews: Vec<serde_json::Value> = approvers
            .iter()
            .map(|login| serde_json::json!({ "user": { "login": login }, "state": "APPROVED" }))
            .collect();
        let reviews = serde_json::Value::from(reviews);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let path = request_path(&stream);
                let (status, body) = if path.contains("/commits/") {
                    (commit.0, commit.1.to_string())
                } else if path.contains("/reviews") {
                    ("200 OK", reviews.to_string())
                } else {
                    ("404 Not Found", "{}".to_string())
                };
                respond(stream, status, &body);
            }
        });

        Self { url }
    }
}

fn request_path(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    reader.read_line(&mut request_line).unwrap_or_default();
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) if line == "\r\n" => break,
            Ok(_) => {}
        }
    }
    request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

fn respond(mut stream: TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes());
}

/// The binary with a clean environment rooted in `dir`.
pub fn gate_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("merge-gate").expect("merge-gate binary");
    cmd.current_dir(dir)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("GITHUB_REPOSITORY")
        .env_remove("MERGE_GATE_CODEOWNERS")
        .env_remove("MERGE_GATE_REVIEW_REF")
        .env_remove("RUST_LOG")
        .env("NO_PROXY", "127.0.0.1");
    cmd
}
