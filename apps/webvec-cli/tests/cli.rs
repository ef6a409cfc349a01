use assert_cmd::Command;
use predicates::prelude::*;

fn webvec() -> Command {
    let mut cmd = Command::cargo_bin("webvec").unwrap();
    cmd.env_remove("WEBVEC_API_KEY")
        .env_remove("WEBVEC_API_URL")
        .env_remove("WEBVEC_EMBEDDER_URL");
    cmd
}

#[test]
fn no_subcommand_prints_usage() {
    webvec()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn help_lists_subcommands() {
    webvec()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("reembed"))
        .stdout(predicate::str::contains("index"));
}

#[test]
fn ingest_requires_at_least_one_url() {
    webvec()
        .arg("ingest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("URLS"));
}

#[test]
fn upload_requires_an_index_name() {
    webvec()
        .args(["upload", "vectors.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--index"));
}

#[test]
fn upload_requires_an_api_key() {
    webvec()
        .args(["upload", "vectors.json", "--index", "docs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("api key"));
}

#[test]
fn reembed_requires_an_input_file() {
    webvec()
        .arg("reembed")
        .assert()
        .failure()
        .stderr(predicate::str::contains("INPUT"));
}

#[test]
fn index_describe_requires_a_name() {
    webvec()
        .args(["index", "describe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NAME"));
}
