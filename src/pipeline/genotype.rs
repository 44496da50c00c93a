//! Genotype resolution: per-call genotype codes → actual values.

use anyhow::bail;
use itertools::Itertools;

use crate::data_structs::typedef::GenotypeCode;
use crate::data_structs::variant::Resolved;

/// Resolves a record's genotype codes against a value array.
///
/// The called set is the distinct genotype codes with missing (-1) and
/// reference (0) removed, processed in ascending order so multi-valued
/// results are deterministic. When the called set is empty the call carries
/// no alternate allele: `values[0]` is returned when `default_to_first`
/// (used for allele arrays, whose index 0 is the reference), otherwise
/// [`Resolved::None`] (used for frequency arrays, which have no reference
/// entry).
///
/// `subtract_one` shifts each code down by one before indexing; frequency
/// arrays omit the reference entry, so alt code 1 maps to index 0 there,
/// while allele arrays are indexed by the code directly.
///
/// A code that indexes past the end of `values` is a hard error: it signals
/// corrupt source data and must never be clamped.
pub fn resolve<T: Clone>(
    values: &[T],
    genotype: &[GenotypeCode],
    subtract_one: bool,
    default_to_first: bool,
) -> anyhow::Result<Resolved<T>> {
    let called: Vec<GenotypeCode> = genotype
        .iter()
        .copied()
        .filter(|&code| code > 0)
        .unique()
        .sorted()
        .collect();

    if called.is_empty() {
        return Ok(if default_to_first {
            match values.first() {
                Some(first) => Resolved::One(first.clone()),
                None => Resolved::None,
            }
        }
        else {
            Resolved::None
        });
    }

    let mut resolved = Vec::with_capacity(called.len());
    for code in called {
        let index = if subtract_one {
            (code - 1) as usize
        }
        else {
            code as usize
        };
        match values.get(index) {
            Some(value) => resolved.push(value.clone()),
            None => {
                bail!(
                    "Genotype code {} resolves to index {} but only {} values exist",
                    code,
                    index,
                    values.len()
                )
            },
        }
    }

    Ok(if resolved.len() == 1 {
        Resolved::One(resolved.remove(0))
    }
    else {
        Resolved::Many(resolved)
    })
}
