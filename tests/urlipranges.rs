use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  urlipranges Binary Tests
-------------------------------------------------------------------------------------------------*/

const ENV_VARS: [&str; 6] = [
    "URLIPRANGES_URLS",
    "URLIPRANGES_INTERVAL",
    "URLIPRANGES_TIMEOUT",
    "URLIPRANGES_RETRIES",
    "URLIPRANGES_RETRY_DELAY",
    "URLIPRANGES_CACHE_FILE",
];

/// The binary with a clean configuration environment and a private cache file.
fn command(cache_file: &Path) -> Command {
    let mut command = Command::cargo_bin("urlipranges").unwrap();
    for env_var in ENV_VARS {
        command.env_remove(env_var);
    }
    command
        .arg("--cache-file")
        .arg(cache_file)
        .arg("--retry-delay")
        .arg("10ms");
    command
}

/*--------------------------------------------------------------------------------------
  Version
--------------------------------------------------------------------------------------*/

#[test]
fn command_version() {
    Command::cargo_bin("urlipranges")
        .unwrap()
        .arg("--version")
        .assert()
        .success();
}

/*--------------------------------------------------------------------------------------
  No URLs
--------------------------------------------------------------------------------------*/

#[test]
fn command_no_urls() {
    let dir = tempfile::tempdir().unwrap();
    command(&dir.path().join("ranges.json"))
        .assert()
        .failure()
        .code(1);
}

/*--------------------------------------------------------------------------------------
  Output Formats
--------------------------------------------------------------------------------------*/

/*-----------------------------------------------------------------------------
  Output: CIDR
-----------------------------------------------------------------------------*/

#[test]
fn command_output_cidr() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/ips")
        .with_body("10.0.0.0/8 # note\n\n172.16.0.0/12\n")
        .create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success()
        .stdout("10.0.0.0/8\n172.16.0.0/12\n");

    assert!(dir.path().join("ranges.json").exists());
}

/*-----------------------------------------------------------------------------
  Output: Netmask
-----------------------------------------------------------------------------*/

#[test]
fn command_output_netmask() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/ips").with_body("192.0.2.0/24\n").create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--output")
        .arg("netmask")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success()
        .stdout("192.0.2.0 255.255.255.0\n");
}

/*-----------------------------------------------------------------------------
  Output: Table
-----------------------------------------------------------------------------*/

#[test]
fn command_output_table() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/ips")
        .with_body("192.0.2.0/24\n2001:db8::/32\n")
        .create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--output")
        .arg("table")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success()
        .stdout(predicate::str::contains("2001:db8::/32"))
        .stdout(predicate::str::contains("IPv6 Prefixes"));
}

/*-----------------------------------------------------------------------------
  Output: CSV
-----------------------------------------------------------------------------*/

#[test]
fn command_output_csv() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/ips").with_body("192.0.2.0/24\n").create();
    let dir = tempfile::tempdir().unwrap();
    let csv_file = dir.path().join("prefixes.csv");

    command(&dir.path().join("ranges.json"))
        .arg("--output")
        .arg("none")
        .arg("--csv")
        .arg(&csv_file)
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success();

    let csv = std::fs::read_to_string(csv_file).unwrap();
    assert!(csv.starts_with("IP Prefix,Version,Network Mask\n"));
    assert!(csv.contains("192.0.2.0/24,IPv4,255.255.255.0"));
}

/*--------------------------------------------------------------------------------------
  Retries and Cache Fallback
--------------------------------------------------------------------------------------*/

#[test]
fn command_retries() {
    let mut server = mockito::Server::new();
    let failures = server
        .mock("GET", "/ips")
        .with_status(500)
        .expect(2)
        .create();
    let success = server
        .mock("GET", "/ips")
        .with_body("192.0.2.1/32\n")
        .expect(1)
        .create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--retries")
        .arg("2")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success()
        .stdout("192.0.2.1/32\n");

    failures.assert();
    success.assert();
}

#[test]
fn command_falls_back_to_cache() {
    let mut server = mockito::Server::new();
    let dir = tempfile::tempdir().unwrap();
    let cache_file = dir.path().join("ranges.json");
    let url = format!("{}/ips", server.url());

    // Seed the cache with a successful run
    let good = server.mock("GET", "/ips").with_body("198.51.100.0/24\n").create();
    command(&cache_file).arg(&url).assert().success();
    good.remove();

    let _down = server.mock("GET", "/ips").with_status(503).create();
    command(&cache_file)
        .arg(&url)
        .assert()
        .success()
        .stdout("198.51.100.0/24\n");
}

#[test]
fn command_fails_without_source_or_cache() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/ips")
        .with_status(500)
        .expect(3)
        .create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--retries")
        .arg("2")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .failure()
        .code(1);

    mock.assert();
}

/*--------------------------------------------------------------------------------------
  Contains
--------------------------------------------------------------------------------------*/

#[test]
fn command_contains_address() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/ips")
        .with_body("10.0.0.0/8\n10.1.0.0/16\n")
        .create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--output")
        .arg("none")
        .arg("--contains")
        .arg("10.1.2.3")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .success()
        .stdout("10.1.2.3 in 10.1.0.0/16\n");
}

#[test]
fn command_contains_address_not_found() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/ips").with_body("10.0.0.0/8\n").create();
    let dir = tempfile::tempdir().unwrap();

    command(&dir.path().join("ranges.json"))
        .arg("--output")
        .arg("none")
        .arg("--contains")
        .arg("1.1.1.1")
        .arg(format!("{}/ips", server.url()))
        .assert()
        .failure()
        .code(1)
        .stdout("1.1.1.1 not found\n");
}
