//! Synthetic MOF datasets for tests across the workspace.
//!
//! Column names mirror the default dataset schema so generated CSV text can be
//! fed straight into the loader.

use mofgen_common::{LabeledRecord, MofRecord, PerProperty};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub use pretty_assertions;

pub const NUMERIC_COLUMNS: [&str; 6] = [
    "volume [A^3]",
    "surface_area [m^2/g]",
    "void_fraction",
    "void_volume [cm^3/g]",
    "largest_free_sphere_diameter [A]",
    "weight [u]",
];

pub const CATEGORICAL_COLUMNS: [&str; 2] = ["topology", "functional_groups"];

/// Target columns in `Property::ALL` order.
pub const TARGET_COLUMNS: [&str; 4] = [
    "Ground_State_Energy",
    "CO2_uptake_P0.15bar_T298K [mmol/g]",
    "CO2/N2_selectivity",
    "heat_adsorption_CO2_P0.15bar_T298K [kcal/mol]",
];

pub const TOPOLOGIES: [&str; 4] = ["dia", "fcu", "pcu", "sql"];
pub const FUNCTIONAL_GROUPS: [&str; 4] = ["CH3", "NH2", "OH", "none"];

/// `n` plausible MOF records whose targets depend smoothly on the descriptors,
/// so the regressors have something to learn.
pub fn synthetic_records(n: usize, seed: u64) -> Vec<LabeledRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let volume: f64 = rng.gen_range(800.0..6000.0);
            let surface_area: f64 = rng.gen_range(200.0..4500.0);
            let void_fraction: f64 = rng.gen_range(0.2..0.9);
            let void_volume = void_fraction * rng.gen_range(0.8..1.6);
            let lfs: f64 = rng.gen_range(3.0..15.0);
            let weight: f64 = rng.gen_range(500.0..4000.0);
            let topo = rng.gen_range(0..TOPOLOGIES.len());
            let group = rng.gen_range(0..FUNCTIONAL_GROUPS.len());

            let noise = |rng: &mut StdRng| rng.gen_range(-0.05..0.05);
            let gs = -0.0004 * surface_area - 0.3 * topo as f64 + noise(&mut rng);
            let co2 = 3.0 * void_fraction + 0.2 * group as f64 + noise(&mut rng);
            let sel = 20.0 - lfs + 2.0 * group as f64 + noise(&mut rng);
            let heat = 4.0 + 0.002 * weight / 10.0 + 0.5 * topo as f64 + noise(&mut rng);

            let record = MofRecord {
                name: Some(format!("MOF-{i:04}")),
                ..Default::default()
            }
            .with_numeric(NUMERIC_COLUMNS[0], volume)
            .with_numeric(NUMERIC_COLUMNS[1], surface_area)
            .with_numeric(NUMERIC_COLUMNS[2], void_fraction)
            .with_numeric(NUMERIC_COLUMNS[3], void_volume)
            .with_numeric(NUMERIC_COLUMNS[4], lfs)
            .with_numeric(NUMERIC_COLUMNS[5], weight)
            .with_categorical(CATEGORICAL_COLUMNS[0], TOPOLOGIES[topo])
            .with_categorical(CATEGORICAL_COLUMNS[1], FUNCTIONAL_GROUPS[group]);

            LabeledRecord {
                record,
                targets: PerProperty::new(gs, co2, sel, heat),
            }
        })
        .collect()
}

/// Render records as CSV text with the default column names and a `name`
/// id column.
pub fn to_csv(records: &[LabeledRecord]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["name"];
    header.extend(NUMERIC_COLUMNS);
    header.extend(CATEGORICAL_COLUMNS);
    header.extend(TARGET_COLUMNS);
    writer.write_record(&header)?;

    for r in records {
        let mut row = vec![r.record.name.clone().unwrap_or_default()];
        for col in NUMERIC_COLUMNS {
            row.push(r.record.numeric.get(col).map(|v| v.to_string()).unwrap_or_default());
        }
        for col in CATEGORICAL_COLUMNS {
            row.push(r.record.categorical.get(col).cloned().unwrap_or_default());
        }
        for (_, v) in r.targets.iter() {
            row.push(v.to_string());
        }
        writer.write_record(&row)?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_is_seeded() {
        assert_eq!(synthetic_records(20, 3), synthetic_records(20, 3));
        assert_ne!(synthetic_records(20, 3), synthetic_records(20, 4));
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let csv = to_csv(&synthetic_records(5, 1)).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("name,volume [A^3]"));
    }
}
