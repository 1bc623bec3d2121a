use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use ethers_core::types::{Address, Bytes, H256, U256};
use serde_json::json;
use tracing::Level;
use zeroize::Zeroizing;

use evm_codec::abi::{parse_quantity, selector, topic, FunctionDef};
use evm_codec::rlp::decode_flat;
use evm_codec::signer::{recover_signer, LegacyTransaction, Signer};
use evm_codec::utils::crypto::{decode_hex, encode_hex};
use evm_codec::{to_checksum_address, CodecConfig};

#[derive(Parser, Debug)]
#[command(name = "evm-codec", version, about = "Ethereum ABI/RLP codec and EIP-155 signer")]
struct Cli {
    /// Emit debug logs on stderr (also enabled by EVM_CODEC_TRACE=1)
    #[arg(long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the 4-byte selector of a function signature
    Selector { signature: String },

    /// Print the topic hash of an event signature
    Topic { signature: String },

    /// Decode RLP and print every string item as hex
    RlpDecode { data: String },

    /// Sign a legacy transaction with EIP-155 replay protection
    SignTx {
        /// Private key as hex
        #[arg(long)]
        key: String,
        #[arg(long, default_value_t = 1)]
        chain_id: u64,
        #[arg(long, default_value = "0")]
        nonce: String,
        /// Gas price in wei
        #[arg(long)]
        gas_price: String,
        #[arg(long, default_value = "21000")]
        gas_limit: String,
        /// Recipient; omit for contract creation
        #[arg(long)]
        to: Option<String>,
        /// Value in wei
        #[arg(long, default_value = "0")]
        value: String,
        /// Calldata as hex
        #[arg(long)]
        data: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Recover the signer address of a 32-byte hash
    Recover {
        #[arg(long)]
        hash: String,
        /// 65-byte r || s || v signature as hex
        #[arg(long)]
        signature: String,
    },
}

fn parse_address(s: &str) -> anyhow::Result<Address> {
    let bytes = decode_hex(s).with_context(|| format!("invalid address {s:?}"))?;
    if bytes.len() != 20 {
        bail!("address must be 20 bytes, got {}", bytes.len());
    }
    Ok(Address::from_slice(&bytes))
}

/// 32-byte big-endian hex of a quantity
fn word_hex(value: U256) -> String {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    encode_hex(&word)
}

fn canonical_signature(signature: &str) -> anyhow::Result<String> {
    let def = FunctionDef::from_signature(signature)?;
    Ok(def.signature().to_string())
}

fn init_tracing(config: &CodecConfig) {
    let level = if config.trace { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = if cli.trace { CodecConfig::traced() } else { CodecConfig::from_env() };
    init_tracing(&config);

    match cli.command {
        Command::Selector { signature } => {
            println!("{}", encode_hex(&selector(&canonical_signature(&signature)?)));
        }
        Command::Topic { signature } => {
            println!("{}", encode_hex(topic(&canonical_signature(&signature)?).as_bytes()));
        }
        Command::RlpDecode { data } => {
            let bytes = decode_hex(&data).context("invalid hex input")?;
            for item in decode_flat(&bytes)? {
                println!("{}", encode_hex(item));
            }
        }
        Command::SignTx {
            key,
            chain_id,
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            json,
        } => {
            let key = Zeroizing::new(key);
            let key_bytes = Zeroizing::new(decode_hex(&key).context("invalid private key hex")?);
            let key_bytes: [u8; 32] = key_bytes
                .as_slice()
                .try_into()
                .context("private key must be 32 bytes")?;
            let signer = Signer::with_config(key_bytes, chain_id, config)?;

            let transaction = LegacyTransaction {
                nonce: parse_quantity(&nonce)?,
                gas_price: parse_quantity(&gas_price)?,
                gas_limit: parse_quantity(&gas_limit)?,
                to: to.as_deref().map(parse_address).transpose()?,
                value: parse_quantity(&value)?,
                data: match data {
                    Some(hex) => Bytes::from(decode_hex(&hex).context("invalid calldata hex")?),
                    None => Bytes::default(),
                },
                chain_id: Some(chain_id),
            };
            let signed = signer.sign_transaction(&transaction)?;
            let raw = signed.raw()?;
            let hash = signed.hash()?;
            let signature = &signed.signature;

            if json {
                let output = json!({
                    "from": to_checksum_address(signer.address().as_bytes()),
                    "v": signature.v,
                    "r": word_hex(signature.r),
                    "s": word_hex(signature.s),
                    "raw": encode_hex(&raw),
                    "hash": encode_hex(hash.as_bytes()),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                println!("v: {}", signature.v);
                println!("r: {}", word_hex(signature.r));
                println!("s: {}", word_hex(signature.s));
                println!("raw: {}", encode_hex(&raw));
                println!("hash: {}", encode_hex(hash.as_bytes()));
            }
        }
        Command::Recover { hash, signature } => {
            let hash_bytes = decode_hex(&hash).context("invalid hash hex")?;
            if hash_bytes.len() != 32 {
                bail!("hash must be 32 bytes, got {}", hash_bytes.len());
            }
            let sig_bytes = decode_hex(&signature).context("invalid signature hex")?;
            let sig_bytes: [u8; 65] = sig_bytes
                .as_slice()
                .try_into()
                .context("signature must be 65 bytes")?;
            let address = recover_signer(&sig_bytes, H256::from_slice(&hash_bytes))?;
            println!("{}", to_checksum_address(address.as_bytes()));
        }
    }

    Ok(())
}
