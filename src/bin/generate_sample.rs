//! Write a synthetic ring trial: a DIA-NN style precursor matrix and the
//! matching protein-group matrix.
//!
//! ```bash
//! cargo run --bin generate_sample -- sample_data
//! pepcover ringtrial --folder sample_data
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};

const N_PROTEINS: usize = 400;
const N_RUNS: usize = 6;
const AMINO_ACIDS: &[u8] = b"ACDEFGHIKLMNPQRSTVWY";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Precursor {
    protein: usize,
    sequence: String,
    charge: u8,
    /// Intensity per run; `None` when not detected.
    quantities: Vec<Option<f64>>,
}

fn peptide(rng: &mut SimpleRng) -> String {
    let len = 7 + rng.below(14);
    let mut seq: String = (0..len - 1)
        .map(|_| AMINO_ACIDS[rng.below(AMINO_ACIDS.len())] as char)
        .collect();
    // tryptic C-terminus
    seq.push(if rng.next_f64() < 0.5 { 'K' } else { 'R' });
    seq
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let runs: Vec<String> = (1..=N_RUNS)
        .map(|i| format!(r"D:\MS_data\CSF_ringtrial_R0{i}.raw"))
        .collect();
    let proteins: Vec<String> = (0..N_PROTEINS).map(|i| format!("P{:05}", 10_000 + i)).collect();

    let mut precursors = Vec::new();
    for protein in 0..N_PROTEINS {
        // log10 abundance drives both the peptide count and detectability
        let abundance = rng.gauss(6.0, 1.0);
        let n_peptides = 1 + rng.below(((abundance - 3.0).max(1.0) * 3.0) as usize);
        for _ in 0..n_peptides {
            let sequence = peptide(&mut rng);
            let n_charges = 1 + rng.below(3);
            for charge in 2..2 + n_charges as u8 {
                let detect = ((abundance - 4.0) / 4.0).clamp(0.05, 0.97);
                let quantities = (0..N_RUNS)
                    .map(|_| {
                        (rng.next_f64() < detect)
                            .then(|| 10f64.powf(abundance + rng.gauss(0.0, 0.3)))
                    })
                    .collect();
                precursors.push(Precursor {
                    protein,
                    sequence: sequence.clone(),
                    charge,
                    quantities,
                });
            }
        }
    }

    let field = |q: Option<f64>| q.map(|v| format!("{v:.1}")).unwrap_or_default();

    // Precursor matrix
    let pr_path = out_dir.join("report_CSF_ringtrial.pr_matrix.tsv");
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(&pr_path)?;
    let mut header = vec![
        "Protein.Group".to_string(),
        "Stripped.Sequence".to_string(),
        "Precursor.Charge".to_string(),
        "Precursor.Id".to_string(),
    ];
    header.extend(runs.iter().cloned());
    writer.write_record(&header)?;
    for pr in &precursors {
        let mut record = vec![
            proteins[pr.protein].clone(),
            pr.sequence.clone(),
            pr.charge.to_string(),
            format!("{}{}", pr.sequence, pr.charge),
        ];
        record.extend(pr.quantities.iter().map(|&q| field(q)));
        writer.write_record(&record)?;
    }
    writer.flush()?;

    // Protein matrix: sum of detected precursors per run
    let pg_path = out_dir.join("report_CSF_ringtrial.pg_matrix.tsv");
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(&pg_path)?;
    let mut header = vec!["Protein.Group".to_string(), "Genes".to_string()];
    header.extend(runs.iter().cloned());
    writer.write_record(&header)?;
    let mut n_groups = 0;
    for (protein, name) in proteins.iter().enumerate() {
        let totals: Vec<Option<f64>> = (0..N_RUNS)
            .map(|run| {
                precursors
                    .iter()
                    .filter(|pr| pr.protein == protein)
                    .filter_map(|pr| pr.quantities[run])
                    .reduce(|a, b| a + b)
            })
            .collect();
        if totals.iter().all(Option::is_none) {
            continue;
        }
        let mut record = vec![name.clone(), format!("GENE{protein}")];
        record.extend(totals.into_iter().map(field));
        writer.write_record(&record)?;
        n_groups += 1;
    }
    writer.flush()?;

    println!(
        "Wrote {} precursors to {} and {n_groups} protein groups to {}",
        precursors.len(),
        pr_path.display(),
        pg_path.display()
    );
    Ok(())
}
