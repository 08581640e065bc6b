#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kit() -> Command {
    Command::new(cargo_bin("kit"))
}

#[test]
fn sha256sum_of_stdin() {
    kit()
        .args(["sha256sum"])
        .write_stdin("abc")
        .assert()
        .success()
        .stdout("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad  -\n");
}

#[test]
fn csv2json_pretty() {
    kit()
        .args(["csv2json", "-p"])
        .write_stdin("a,b,c\n1,2,3\n4,5,6\n")
        .assert()
        .success()
        .stdout("[\n  {\"a\": 1, \"b\": 2, \"c\": 3},\n  {\"a\": 4, \"b\": 5, \"c\": 6}\n]\n");
}

#[test]
fn slugify_folds_punctuation() {
    kit()
        .arg("slugify")
        .write_stdin("Hello, World!\n")
        .assert()
        .success()
        .stdout("hello-world\n");
}

#[test]
fn factor_and_seq() {
    kit()
        .args(["factor", "360"])
        .assert()
        .success()
        .stdout("360: 2 2 2 3 3 5\n");

    kit()
        .args(["seq", "1", "2", "7"])
        .assert()
        .success()
        .stdout("1\n3\n5\n7\n");
}

#[test]
fn dedup_counts_in_first_seen_order() {
    kit()
        .args(["dedup", "-c"])
        .write_stdin("a\nb\na\nc\na\n")
        .assert()
        .success()
        .stdout("      3 a\n      1 b\n      1 c\n");
}

#[test]
fn base64_decode() {
    kit()
        .args(["base64", "-d"])
        .write_stdin("SGVsbG8=\n")
        .assert()
        .success()
        .stdout("Hello");
}

#[test]
fn roman_both_directions() {
    kit()
        .args(["roman", "1994"])
        .assert()
        .success()
        .stdout("1994 → MCMXCIV\n");

    kit()
        .args(["roman", "MCMXCIV"])
        .assert()
        .success()
        .stdout("MCMXCIV → 1994\n");
}

#[test]
fn false_predicate_exits_one() {
    kit()
        .args(["anagram", "abc", "abd"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("are not anagrams"));
}

#[test]
fn usage_errors_exit_two() {
    kit()
        .args(["factor", "--bogus"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("factor: "));

    kit()
        .arg("no-such-tool")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown tool 'no-such-tool'"));
}

#[test]
fn missing_file_reports_tool_prefix() {
    kit()
        .args(["wc", "-l", "/nonexistent/kit-input"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("wc: /nonexistent/kit-input"));
}

#[test]
fn legacy_head_count() {
    kit()
        .args(["head", "-2"])
        .write_stdin("1\n2\n3\n")
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn list_names_every_tool() {
    kit()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("sha256sum\n").and(predicate::str::contains("timeout2\n")));
}

#[test]
fn invoked_through_a_link_named_after_the_tool() {
    let temp = TempDir::new().unwrap();
    let link = temp.path().join("roman");
    std::os::unix::fs::symlink(cargo_bin("kit"), &link).unwrap();

    Command::new(&link)
        .arg("14")
        .assert()
        .success()
        .stdout("14 → XIV\n");
}

#[test]
fn timeout_reports_124() {
    kit()
        .args(["timeout", "0.2", "sleep", "5"])
        .assert()
        .code(124);
}

#[test]
fn help_is_long_only() {
    kit()
        .args(["seq", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: seq"));
}

#[test]
fn tail_from_line_k() {
    kit()
        .args(["tail", "-n", "+3"])
        .write_stdin("1\n2\n3\n4\n")
        .assert()
        .success()
        .stdout("3\n4\n");
}

#[test]
fn tail_from_byte_k() {
    kit()
        .args(["tail", "-c", "+3"])
        .write_stdin("1\n2\n3\n4\n")
        .assert()
        .success()
        .stdout("2\n3\n4\n");
}

#[test]
fn head_all_but_last() {
    kit()
        .args(["head", "-n", "-1"])
        .write_stdin("1\n2\n3\n")
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn dotenv_drops_inline_comments() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("app.env");
    std::fs::write(&file, "A=1\nB=x # inline\n").unwrap();

    kit()
        .args(["dotenv", "-f"])
        .arg(&file)
        .assert()
        .success()
        .stdout("export A=1\nexport B=x\n");
}

#[test]
fn template_keeps_final_newline() {
    kit()
        .args(["template", "-d", "{\"x\":1}"])
        .write_stdin("a {{ x }}\nb\n")
        .assert()
        .success()
        .stdout("a 1\nb\n");
}

#[test]
fn force_killed_command_still_reports_124() {
    kit()
        .args(["timeout2", "-k", "0.3", "0.2", "sh", "-c", "trap '' TERM; exec sleep 20"])
        .assert()
        .code(124);
}

#[test]
fn cut_rejects_bad_field_list() {
    kit()
        .args(["cut", "-f", "0"])
        .write_stdin("a\tb\n")
        .assert()
        .code(2);

    kit()
        .args(["cut", "-d", "ab", "-f", "1"])
        .write_stdin("a\tb\n")
        .assert()
        .code(2);
}
