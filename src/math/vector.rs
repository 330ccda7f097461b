//! Elementwise helpers over plain `f64` slices.

use crate::error::{KernelError, Result};

pub fn check_same_len(a: &[f64], b: &[f64]) -> Result<()> {
    if a.len() != b.len() {
        return Err(KernelError::shape(
            format!("length {}", a.len()),
            format!("length {}", b.len()),
        ));
    }
    Ok(())
}

pub fn add(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_same_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x + y).collect())
}

pub fn mul(a: &[f64], b: &[f64]) -> Result<Vec<f64>> {
    check_same_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x * y).collect())
}

pub fn sum(a: &[f64]) -> f64 {
    a.iter().sum()
}

/// Arithmetic mean; `0.0` for an empty slice.
pub fn mean(a: &[f64]) -> f64 {
    if a.is_empty() { 0.0 } else { sum(a) / a.len() as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_elementwise() {
        assert_eq!(add(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), vec![4.0, 6.0]);
        assert_eq!(mul(&[1.0, 2.0], &[3.0, 4.0]).unwrap(), vec![3.0, 8.0]);
        assert!(add(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn empty_mean_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
