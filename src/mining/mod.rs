//! Proof-of-work search

pub mod pow;

pub use pow::{
    candidate_content, check_proof, find_proof_of_work, PowError, PowSolution, ProofOfWork,
    SearchLimit,
};
