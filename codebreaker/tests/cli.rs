use std::error::Error;
use std::fs;
use std::process::{Command, Output};
use tempfile::tempdir;

fn codebreaker_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_codebreaker"))
}

fn run(args: &[&str]) -> Result<Output, Box<dyn Error>> {
    Ok(codebreaker_cmd().args(args).output()?)
}

#[test]
fn stats_command_reports_entropy() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"AABBBBCC")?;

    let output = run(&["stats", input.to_str().unwrap()])?;
    assert!(
        output.status.success(),
        "stats failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Codebreaker Block Statistics"));
    assert!(stdout.contains("Shannon Entropy: 1.5000"));
    assert!(stdout.contains("Distinct blocks: 3"));
    Ok(())
}

#[test]
fn stats_command_accepts_bit_blocks() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"AABBBBCC")?;

    let output = run(&["stats", input.to_str().unwrap(), "--blocksize-bits", "4"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Block size: 4 bits (16 blocks)"));

    let output = run(&[
        "stats",
        input.to_str().unwrap(),
        "--blocksize",
        "1",
        "--blocksize-bits",
        "4",
    ])?;
    assert!(!output.status.success());
    Ok(())
}

#[test]
fn analyze_command_sweeps_block_sizes() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"AAAABBBBCCCC")?;

    let output = run(&["analyze", input.to_str().unwrap()])?;
    assert!(
        output.status.success(),
        "analyze failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Codebreaker Block Size Analyzer"));
    assert!(stdout.contains("Size: 12 B"));
    Ok(())
}

#[test]
fn keys_command_ranks_rotations() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let input = dir.path().join("data.bin");
    fs::write(&input, b"ABCABCABCABC")?;

    let output = run(&["keys", input.to_str().unwrap(), "--top", "2"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Rotations tried: 11 (step 8 bits)"));
    assert!(stdout.contains("3B"));
    Ok(())
}

#[test]
fn missing_file_fails() -> Result<(), Box<dyn Error>> {
    let output = run(&["stats", "/nonexistent/file.bin"])?;
    assert!(!output.status.success());
    Ok(())
}
