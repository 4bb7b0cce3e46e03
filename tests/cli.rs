use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn bitdiff() -> Command {
    let mut cmd = Command::cargo_bin("bitdiff").expect("should find bitdiff binary");
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn identical_files_exit_zero() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, [1u8, 2, 3, 4])?;
    fs::write(&b, [1u8, 2, 3, 4])?;

    bitdiff()
        .arg(&a)
        .arg(&b)
        .arg("--no-header")
        .assert()
        .code(0)
        .stdout("")
        .stderr(predicate::str::contains("0 differences found"));

    Ok(())
}

#[test]
fn differences_exit_one_with_bit_lines() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, [0x00u8, 0xff])?;
    fs::write(&b, [0x00u8, 0x0f])?;

    let header = format!("Offset\tByte in {}\tByte in {}\n", a.display(), b.display());
    bitdiff()
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout(format!(
            "{header}0x0000000000000001\t0b1111....\t0b0000....\n"
        ))
        .stderr(predicate::str::contains("1 difference found, 4 bits"));

    Ok(())
}

#[test]
fn hex_mode_with_small_buffer() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, b"abcdefgh")?;
    fs::write(&b, b"abcdXfgh-trailing")?;

    bitdiff()
        .args(["--mode", "hex", "--no-header", "--buffer-size", "3"])
        .arg(&a)
        .arg(&b)
        .assert()
        .code(1)
        .stdout("0x0000000000000004\t0x65\t0x58\n")
        .stderr(predicate::str::contains("differ in size"));

    Ok(())
}

#[test]
fn quiet_suppresses_progress() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, [7u8])?;
    fs::write(&b, [7u8])?;

    bitdiff()
        .arg("-q")
        .arg(&a)
        .arg(&b)
        .assert()
        .code(0)
        .stderr("");

    Ok(())
}

#[test]
fn same_path_is_not_read() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let missing = tmp.path().join("never-created.bin");

    bitdiff()
        .arg(&missing)
        .arg(&missing)
        .assert()
        .code(0)
        .stdout("")
        .stderr(predicate::str::contains("same path"));

    Ok(())
}

#[test]
fn missing_file_is_fatal() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    fs::write(&a, [1u8])?;

    bitdiff()
        .arg(&a)
        .arg(tmp.path().join("missing.bin"))
        .assert()
        .code(10)
        .stdout("")
        .stderr(predicate::str::contains("unable to open"));

    Ok(())
}

#[test]
fn zero_buffer_size_is_fatal() -> anyhow::Result<()> {
    let tmp = tempdir()?;
    let a = tmp.path().join("a.bin");
    let b = tmp.path().join("b.bin");
    fs::write(&a, [1u8])?;
    fs::write(&b, [2u8])?;

    bitdiff()
        .args(["-b", "0"])
        .arg(&a)
        .arg(&b)
        .assert()
        .code(10)
        .stderr(predicate::str::contains("chunk size"));

    Ok(())
}

#[test]
fn bad_mode_is_a_usage_error() {
    bitdiff()
        .args(["--mode", "octal", "a", "b"])
        .assert()
        .code(2);
}
