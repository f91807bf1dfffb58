//! CLI commands
//!
//! Implements the demo sequence and the single-purpose commands.

use crate::crypto::{sha256_hex, KeyPair, DEFAULT_KEY_BITS};
use crate::mining::{candidate_content, check_proof, PowSolution, ProofOfWork, SearchLimit};
use log::info;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Identifier used when none is given
pub const DEFAULT_IDENTIFIER: &str = "ruochen";

/// Difficulties searched by the demo when none are given
pub const DEFAULT_DIFFICULTIES: [usize; 2] = [4, 5];

/// Parameters of a demo run
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub identifier: String,
    /// The first difficulty's result is signed and verified
    pub difficulties: Vec<usize>,
    pub key_bits: usize,
    pub limit: SearchLimit,
    pub threads: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_string(),
            difficulties: DEFAULT_DIFFICULTIES.to_vec(),
            key_bits: DEFAULT_KEY_BITS,
            limit: SearchLimit::unbounded(),
            threads: 1,
        }
    }
}

/// Run one search honoring the configured limit and thread count
pub fn run_search(
    identifier: &str,
    difficulty: usize,
    limit: SearchLimit,
    threads: usize,
) -> CliResult<PowSolution> {
    let pow = ProofOfWork::new(identifier, difficulty);
    Ok(pow.solve_parallel(limit, threads)?)
}

/// Generate keys, solve, sign, verify, then solve the remaining difficulties
pub fn cmd_demo(config: &DemoConfig) -> CliResult<()> {
    let (first, rest) = config
        .difficulties
        .split_first()
        .ok_or("at least one difficulty is required")?;

    println!("🔑 Generating RSA key pair...");
    let key_pair = KeyPair::generate(config.key_bits)?;
    println!("✅ RSA key pair generated.");
    println!("   Public key modulus: {} bits", key_pair.modulus_bits());

    println!("\n⛏️  Executing proof of work...");
    println!("{}", search_header(*first));
    let solution = run_search(&config.identifier, *first, config.limit, config.threads)?;
    print_solution(&solution);

    println!("\n✍️  Signing the proof of work data...");
    let data = solution.content.as_bytes();
    let signature = key_pair.sign(data)?;
    println!("✅ Data signed.");
    println!("   Signature: {}", hex::encode(&signature));

    println!("\n🔍 Verifying the signature...");
    key_pair.verify(data, &signature)?;
    println!("✅ Signature verified successfully.");

    for &difficulty in rest {
        println!("-----------------------------------");
        println!("{}", search_header(difficulty));
        let solution = run_search(&config.identifier, difficulty, config.limit, config.threads)?;
        print_solution(&solution);
    }

    info!("Demo finished");
    Ok(())
}

/// Run a single search and print the result
pub fn cmd_pow(
    identifier: &str,
    difficulty: usize,
    limit: SearchLimit,
    threads: usize,
    json: bool,
) -> CliResult<()> {
    if !json {
        println!("{}", search_header(difficulty));
    }
    let solution = run_search(identifier, difficulty, limit, threads)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&solution)?);
    } else {
        print_solution(&solution);
    }

    Ok(())
}

/// Generate a key pair and print its public half
pub fn cmd_keygen(bits: usize) -> CliResult<()> {
    println!("🔑 Generating {}-bit RSA key pair...", bits);
    let key_pair = KeyPair::generate(bits)?;

    println!("✅ RSA key pair generated.");
    println!("   Public key modulus: {} bits", key_pair.modulus_bits());
    println!();
    print!("{}", key_pair.public_key_pem()?);

    Ok(())
}

/// Check a claimed nonce
pub fn cmd_check(identifier: &str, nonce: u64, difficulty: usize) -> CliResult<()> {
    let content = candidate_content(identifier, nonce);
    let hash = sha256_hex(content.as_bytes());

    println!("   Content: {}", content);
    println!("   SHA256 hash: {}", hash);

    if !check_proof(identifier, nonce, difficulty) {
        return Err(format!(
            "nonce {} does not meet difficulty {} for '{}'",
            nonce, difficulty, identifier
        )
        .into());
    }

    println!("✅ Nonce {} meets difficulty {}", nonce, difficulty);
    Ok(())
}

/// Line announcing a search, printed before it starts
fn search_header(difficulty: usize) -> String {
    format!("   Prefix with {} zeros", difficulty)
}

fn solution_report(solution: &PowSolution) -> String {
    [
        format!("   ├─ Time taken: {:?}", solution.elapsed),
        format!("   ├─ Content: {}", solution.content),
        format!("   ├─ Nonce: {}", solution.nonce),
        format!("   ├─ Prefix: {}", solution.prefix()),
        format!("   ├─ SHA256 hash: {}", solution.hash),
        format!("   └─ Hash rate: {:.2} H/s", solution.hash_rate()),
    ]
    .join("\n")
}

fn print_solution(solution: &PowSolution) {
    println!("{}", solution_report(solution));
}
