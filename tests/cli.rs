use std::error::Error;
use std::fs;
use std::process::{Command, Output};
use tempfile::tempdir;

fn bitblob_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bitblob"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(bitblob_cmd().args(args).output()?)
}

#[test]
fn version_flag_prints_version() -> Result<(), Box<dyn Error>> {
    let output = run(&["-V"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("bitblob "));
    Ok(())
}

#[test]
fn info_command_lists_candidates() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"AAAABBBBCCCC")?;

    let output = run(&["info", input.to_str().unwrap()])?;
    assert!(
        output.status.success(),
        "info failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Blob Information"));
    assert!(stdout.contains("Bytes: 1, 2, 3, 4, 6"));

    let output = run(&["info", "--json", input.to_str().unwrap()])?;
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["size"], 12);
    Ok(())
}

#[test]
fn split_command_writes_fragments() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    let out = dir.path().join("parts");
    fs::write(&input, b"AAAA\r\nBBBB\r\nCCCC")?;

    let output = run(&[
        "split",
        input.to_str().unwrap(),
        "--sep",
        "0d0a",
        "--out",
        out.to_str().unwrap(),
    ])?;
    assert!(
        output.status.success(),
        "split failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read(out.join("data.bin.0000.bin"))?, b"AAAA");
    assert_eq!(fs::read(out.join("data.bin.0002.bin"))?, b"CCCC");
    Ok(())
}

#[test]
fn split_command_requires_one_criterion() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"AAAA")?;

    assert!(!run(&["split", input.to_str().unwrap()])?.status.success());
    assert!(!run(&["split", input.to_str().unwrap(), "--size", "2", "--count", "2"])?
        .status
        .success());
    Ok(())
}

#[test]
fn xor_command_roundtrips() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("plain.txt");
    let encrypted = dir.path().join("enc.bin");
    let decrypted = dir.path().join("dec.txt");
    fs::write(&input, b"ABCD")?;

    let output = run(&[
        "xor",
        input.to_str().unwrap(),
        "--key",
        "20",
        encrypted.to_str().unwrap(),
    ])?;
    assert!(output.status.success());
    assert_eq!(fs::read(&encrypted)?, b"abcd");

    let key_file = dir.path().join("key");
    fs::write(&key_file, b" ")?;
    let output = run(&[
        "xor",
        encrypted.to_str().unwrap(),
        "--key-file",
        key_file.to_str().unwrap(),
        decrypted.to_str().unwrap(),
    ])?;
    assert!(output.status.success());
    assert_eq!(fs::read(&decrypted)?, b"ABCD");
    Ok(())
}

#[test]
fn xor_command_strict_reports_mismatch() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("plain.txt");
    fs::write(&input, b"ABCD")?;

    let output = run(&[
        "xor",
        input.to_str().unwrap(),
        "--key",
        "20",
        "--strict",
        dir.path().join("out").to_str().unwrap(),
    ])?;
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("Error: Operand lengths differ"));
    Ok(())
}

#[test]
fn rol_command_accepts_units() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("in.bin");
    let rotated = dir.path().join("out.bin");
    fs::write(&input, b"ABCD")?;

    let output = run(&["rol", input.to_str().unwrap(), "1", rotated.to_str().unwrap()])?;
    assert!(output.status.success());
    assert_eq!(fs::read(&rotated)?, b"BCDA");

    let output = run(&["rol", input.to_str().unwrap(), "-8bits", rotated.to_str().unwrap()])?;
    assert!(output.status.success());
    assert_eq!(fs::read(&rotated)?, b"DABC");

    let output = run(&["rol", input.to_str().unwrap(), "3parsecs", rotated.to_str().unwrap()])?;
    assert!(!output.status.success());
    Ok(())
}
