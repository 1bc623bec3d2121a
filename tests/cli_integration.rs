use evm_codec::signer::{personal_message_hash, Signer};
use serde_json::Value;
use std::process::{Command, Output};

const KEY: &str = "0x4646464646464646464646464646464646464646464646464646464646464646";

const EIP155_RAW: &str = concat!(
    "0xf86c098504a817c800825208943535353535353535353535353535353535353535",
    "880de0b6b3a76400008025a028ef61340bd939bc2195fe537567866003e1a15d3c",
    "71ff63e1590620aa636276a067cbe9d8997f761aecb703304b3800ccf555c9f3dc",
    "64214b297fb1966a3b6d83",
);

fn run(args: &[&str]) -> Output {
    let binary_path = assert_cmd::cargo::cargo_bin!("evm-codec");
    Command::new(binary_path)
        .args(args)
        .env_remove("EVM_CODEC_TRACE")
        .output()
        .expect("cli runs")
}

fn stdout_of(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "cli exited unsuccessfully: {:?}",
        output
    );
    String::from_utf8(output.stdout).expect("stdout is utf8")
}

fn eip155_args(json: bool) -> Vec<&'static str> {
    let mut args = vec![
        "sign-tx",
        "--key",
        KEY,
        "--chain-id",
        "1",
        "--nonce",
        "9",
        "--gas-price",
        "20000000000",
        "--gas-limit",
        "21000",
        "--to",
        "0x3535353535353535353535353535353535353535",
        "--value",
        "1000000000000000000",
    ];
    if json {
        args.push("--json");
    }
    args
}

#[test]
fn cli_prints_function_selector() {
    assert_eq!(stdout_of(&["selector", "transfer(address,uint256)"]).trim(), "0xa9059cbb");
    // aliases are canonicalized before hashing
    assert_eq!(stdout_of(&["selector", "transfer(address,uint)"]).trim(), "0xa9059cbb");
}

#[test]
fn cli_prints_event_topic() {
    assert_eq!(
        stdout_of(&["topic", "Transfer(address,address,uint256)"]).trim(),
        "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
    );
}

#[test]
fn cli_decodes_rlp_items() {
    // ["cat", "dog"]
    let stdout = stdout_of(&["rlp-decode", "0xc88363617483646f67"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["0x636174", "0x646f67"]);
}

#[test]
fn cli_signs_eip155_transaction() {
    let stdout = stdout_of(&eip155_args(false));
    assert!(stdout.contains("v: 37"), "unexpected output: {stdout}");
    assert!(stdout.contains(
        "r: 0x28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"
    ));
    assert!(stdout.contains(
        "s: 0x67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
    ));
    assert!(stdout.contains(&format!("raw: {EIP155_RAW}")));
}

#[test]
fn cli_signs_eip155_transaction_as_json() {
    let stdout = stdout_of(&eip155_args(true));
    let output: Value = serde_json::from_str(&stdout).expect("stdout is valid json");

    assert_eq!(output["v"], 37);
    assert_eq!(output["raw"], EIP155_RAW);
    assert_eq!(output["from"], "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F");
}

#[test]
fn cli_recovers_signer() {
    let signer = Signer::from_hex(KEY, 1).expect("valid key");
    let hash = personal_message_hash(b"hello");
    let signature = signer.sign_hash(hash);

    let stdout = stdout_of(&[
        "recover",
        "--hash",
        &format!("0x{}", hex::encode(hash)),
        "--signature",
        &signature.to_string(),
    ]);
    assert_eq!(stdout.trim(), "0x9d8A62f656a8d1615C1294fd71e9CFb3E4855A4F");
}

#[test]
fn cli_rejects_malformed_input() {
    let output = run(&["selector", "transfer(uint7)"]);
    assert!(!output.status.success());

    let output = run(&["rlp-decode", "0xzz"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid hex input"), "unexpected stderr: {stderr}");

    // non-canonical single byte
    let output = run(&["rlp-decode", "0x8100"]);
    assert!(!output.status.success());

    let output = run(&["recover", "--hash", "0x00", "--signature", "0x00"]);
    assert!(!output.status.success());

    let mut args = eip155_args(false);
    args[2] = "0x1234";
    let output = run(&args);
    assert!(!output.status.success());
}

#[test]
fn cli_rejects_bad_quantities_and_chain_ids() {
    // hex quantities are accepted alongside decimal ones
    let mut args = eip155_args(false);
    args[8] = "0x4a817c800";
    let stdout = stdout_of(&args);
    assert!(stdout.contains(&format!("raw: {EIP155_RAW}")), "unexpected output: {stdout}");

    args[8] = "twenty";
    let output = run(&args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid integer"), "unexpected stderr: {stderr}");

    // chain id whose v does not fit in 64 bits
    let mut args = eip155_args(false);
    args[4] = "9223372036854775807";
    let output = run(&args);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("too large"), "unexpected stderr: {stderr}");
}
