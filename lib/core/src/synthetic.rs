//! Synthetic student-performance dataset.
//!
//! Produces labeled records matching [`DatasetSchema::student_performance`]
//! from a seeded rng: demographic and behavioral fields drawn from clipped
//! distributions, and a `final_score` target built from a weighted
//! combination of the factors plus gaussian noise, min-max normalized onto
//! the 0..100 scale. The same seed always yields the same rows.
//!
//! [`DatasetSchema::student_performance`]: crate::schema::DatasetSchema::student_performance

use crate::record::Record;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    rows: usize,
    seed: u64,
}

impl SyntheticDataset {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            seed: DEFAULT_SEED,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate labeled rows (features plus `final_score`).
    pub fn generate(&self) -> Vec<Record> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut rows = Vec::with_capacity(self.rows);
        let mut raw_scores = Vec::with_capacity(self.rows);

        for _ in 0..self.rows {
            let age = normal(&mut rng, 18.5, 1.5).clamp(16.0, 25.0).round();
            let gender = pick(
                &mut rng,
                &[("Male", 0.45), ("Female", 0.50), ("Other", 0.05)],
            );
            let parental_education = pick(
                &mut rng,
                &[
                    ("High School", 0.30),
                    ("Bachelor", 0.35),
                    ("Master", 0.20),
                    ("PhD", 0.10),
                    ("No Formal Education", 0.05),
                ],
            );
            let household_income =
                round2(normal(&mut rng, 10.5, 0.8).exp().clamp(20_000.0, 200_000.0));
            let previous_gpa = round2(rng.random::<f64>().sqrt() * 4.0);
            let study_hours_per_week = round2(gamma2(&mut rng, 3.0).clamp(1.0, 40.0));
            let attendance_rate = round2(rng.random::<f64>().powf(0.2) * 100.0);
            let sleep_hours = round2(normal(&mut rng, 7.0, 1.2).clamp(4.0, 12.0));
            let exercise_hours_per_week =
                round2(exponential(&mut rng, 3.0).clamp(0.0, 20.0));
            let has_internet = if rng.random_bool(0.9) { 1.0 } else { 0.0 };
            let has_computer = if rng.random_bool(0.85) { 1.0 } else { 0.0 };
            let extracurricular_hours = poisson(&mut rng, 3.0).min(15) as f64;
            let school_type = pick(&mut rng, &[("Public", 0.7), ("Private", 0.3)]);
            let class_size = normal(&mut rng, 25.0, 5.0).clamp(10.0, 50.0).round();

            let education_bonus = match parental_education {
                "PhD" => 5.0,
                "Master" => 3.0,
                "Bachelor" => 1.0,
                _ => 0.0,
            };
            let school_bonus = if school_type == "Private" { 2.0 } else { 0.0 };
            let base = previous_gpa * 15.0
                + study_hours_per_week * 1.2
                + attendance_rate * 0.3
                + sleep_hours * 2.0
                + exercise_hours_per_week * 0.5
                + has_internet * 3.0
                + has_computer * 4.0
                + extracurricular_hours * 0.3
                + (household_income / 10_000.0) * 0.2
                + education_bonus
                + school_bonus
                + (30.0 - class_size) * 0.1;
            raw_scores.push(base + normal(&mut rng, 0.0, 5.0));

            rows.push(
                Record::new()
                    .with_field("age", age)
                    .with_field("gender", gender)
                    .with_field("parental_education", parental_education)
                    .with_field("household_income", household_income)
                    .with_field("previous_gpa", previous_gpa)
                    .with_field("study_hours_per_week", study_hours_per_week)
                    .with_field("attendance_rate", attendance_rate)
                    .with_field("sleep_hours", sleep_hours)
                    .with_field("exercise_hours_per_week", exercise_hours_per_week)
                    .with_field("has_internet", has_internet)
                    .with_field("has_computer", has_computer)
                    .with_field("extracurricular_hours", extracurricular_hours)
                    .with_field("school_type", school_type)
                    .with_field("class_size", class_size),
            );
        }

        // Normalize scores onto 0..100 over the generated batch.
        let min = raw_scores.iter().copied().fold(f64::INFINITY, f64::min);
        let max = raw_scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let span = max - min;
        for (row, raw) in rows.iter_mut().zip(raw_scores.iter()) {
            let score = if span > 0.0 {
                round2((raw - min) / span * 100.0)
            } else {
                0.0
            };
            row.insert("final_score", score);
        }
        rows
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Box-Muller draw.
fn normal(rng: &mut StdRng, mean: f64, sd: f64) -> f64 {
    let u1 = rng.random::<f64>().max(f64::MIN_POSITIVE);
    let u2: f64 = rng.random();
    mean + sd * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

fn exponential(rng: &mut StdRng, scale: f64) -> f64 {
    let u = rng.random::<f64>().max(f64::MIN_POSITIVE);
    -scale * u.ln()
}

/// Gamma draw with shape 2: the sum of two exponentials.
fn gamma2(rng: &mut StdRng, scale: f64) -> f64 {
    exponential(rng, scale) + exponential(rng, scale)
}

/// Knuth's poisson sampler; fine for small lambda.
fn poisson(rng: &mut StdRng, lambda: f64) -> u64 {
    let limit = (-lambda).exp();
    let mut k = 0;
    let mut product: f64 = rng.random();
    while product > limit {
        k += 1;
        product *= rng.random::<f64>();
    }
    k
}

fn pick<'a>(rng: &mut StdRng, options: &[(&'a str, f64)]) -> &'a str {
    let mut draw: f64 = rng.random();
    for (label, weight) in options {
        if draw < *weight {
            return label;
        }
        draw -= weight;
    }
    options[options.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Value;
    use crate::schema::DatasetSchema;

    #[test]
    fn test_row_count() {
        assert_eq!(SyntheticDataset::new(25).generate().len(), 25);
    }

    #[test]
    fn test_rows_match_schema() {
        let schema = DatasetSchema::student_performance();
        for row in SyntheticDataset::new(50).generate() {
            schema.split_target(row).unwrap();
        }
    }

    #[test]
    fn test_scores_cover_unit_range() {
        let rows = SyntheticDataset::new(100).generate();
        let scores: Vec<f64> = rows
            .iter()
            .map(|r| r.get("final_score").and_then(Value::as_number).unwrap())
            .collect();
        assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
        // Min-max normalization pins the extremes.
        assert!(scores.iter().any(|&s| s == 0.0));
        assert!(scores.iter().any(|&s| s == 100.0));
    }

    #[test]
    fn test_deterministic_for_seed() {
        let a = SyntheticDataset::new(30).with_seed(7).generate();
        let b = SyntheticDataset::new(30).with_seed(7).generate();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_rows() {
        let a = SyntheticDataset::new(30).with_seed(7).generate();
        let b = SyntheticDataset::new(30).with_seed(8).generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_field_ranges() {
        for row in SyntheticDataset::new(100).generate() {
            let age = row.get("age").and_then(Value::as_number).unwrap();
            assert!((16.0..=25.0).contains(&age));
            let gpa = row.get("previous_gpa").and_then(Value::as_number).unwrap();
            assert!((0.0..=4.0).contains(&gpa));
            let internet = row.get("has_internet").and_then(Value::as_number).unwrap();
            assert!(internet == 0.0 || internet == 1.0);
        }
    }
}
