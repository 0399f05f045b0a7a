//! Verifiable encryption demo: repeated prove / verify / undo with timings

use rand::thread_rng;
use std::error::Error;
use std::time::{Duration, Instant};
use csv::Writer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use vericrypt::{
    keygen, relation_value, sample_short, undo, verify, Polynomial, Prover, Scheme, VeParams,
};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // optional JSON parameter file as the only argument
    let params = match std::env::args().nth(1) {
        Some(path) => VeParams::from_json(path)?,
        None => VeParams::demo(),
    };
    let rounds = 20;

    println!("Initializing verifiable encryption with:");
    println!(
        "N = {}, DIM = {}, VECTOR = {}, NONZERO = {}, sigma = {}, p = {}, q = {}",
        params.degree,
        params.dim,
        params.vector,
        params.nonzero,
        params.sigma_e,
        params.plaintext_modulus,
        params.ciphertext_modulus
    );

    let scheme = Scheme::new(params)?;
    let prover = Prover::new(&scheme);
    let mut rng = thread_rng();
    let (pk, sk) = keygen(&scheme, &mut rng);

    let mut wtr = Writer::from_path("vericrypt_stats.csv")?;
    wtr.write_record(["round", "iterations", "prove_ms", "verify_ms", "undo_ms"])?;

    let mut prove_times = Vec::new();
    let mut successful = 0;
    let start = Instant::now();

    for round in 0..rounds {
        let m: Vec<Polynomial> = (0..scheme.vector())
            .map(|_| sample_short(&scheme, &mut rng))
            .collect();
        let t: Vec<Polynomial> = (0..scheme.vector())
            .map(|_| Polynomial::random(scheme.degree(), scheme.p(), scheme.p() - 1, &mut rng))
            .collect();
        let u = relation_value(&scheme, &t, &m);

        let prove_start = Instant::now();
        let (proof, stats) = prover.prove_with_stats(&t, &u, &m, &pk, &mut rng)?;
        let prove_time = prove_start.elapsed();
        prove_times.push(prove_time);

        let verify_start = Instant::now();
        let valid = verify(&scheme, &proof, &t, &u, &pk);
        let verify_time = verify_start.elapsed();
        if !valid {
            error!(round, "honest proof did not verify");
            break;
        }

        let undo_start = Instant::now();
        let opened = undo(&scheme, &proof, &t, &u, &pk, &sk, &mut rng)?;
        let undo_time = undo_start.elapsed();

        if opened != m || relation_value(&scheme, &t, &opened) != u {
            error!(round, "opened plaintexts do not match");
            break;
        }
        successful += 1;
        info!(round, iterations = stats.iterations, "round complete");

        wtr.write_record(&[
            round.to_string(),
            stats.iterations.to_string(),
            format!("{:.3}", prove_time.as_secs_f64() * 1000.0),
            format!("{:.3}", verify_time.as_secs_f64() * 1000.0),
            format!("{:.3}", undo_time.as_secs_f64() * 1000.0),
        ])?;
    }

    println!("\nTest completed:");
    println!("Total time: {:?}", start.elapsed());
    println!("Successful rounds: {}/{}", successful, rounds);

    if let (Some(max), Some(min)) = (prove_times.iter().max(), prove_times.iter().min()) {
        let avg = prove_times.iter().sum::<Duration>() / prove_times.len() as u32;
        println!("\nProving statistics:");
        println!("Average time: {:?}", avg);
        println!("Maximum time: {:?}", max);
        println!("Minimum time: {:?}", min);
    }
    wtr.flush()?;
    Ok(())
}
