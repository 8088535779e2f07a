use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sbank_bank::{canonical_bank_hash, read_coordinates, KeyView, Metric, Template};
use sbank_core::{CoordinateFrame, NeighborhoodKey};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Bank file (`.json` or `.csv`).
    #[arg(long)]
    pub bank: PathBuf,
    /// Frame whose default metric is used for the norm key.
    #[arg(long, default_value = "Cartesian")]
    pub coord_frame: CoordinateFrame,
}

#[derive(Debug, Serialize)]
struct AxisBounds {
    min: f64,
    max: f64,
}

#[derive(Debug, Serialize)]
struct InspectReport {
    path: String,
    size: usize,
    x1: Option<AxisBounds>,
    x2: Option<AxisBounds>,
    sorted_by: Vec<NeighborhoodKey>,
    bank_hash: String,
}

fn axis_bounds(values: impl Iterator<Item = f64>) -> Option<AxisBounds> {
    values.fold(None, |bounds, value| {
        Some(match bounds {
            None => AxisBounds {
                min: value,
                max: value,
            },
            Some(AxisBounds { min, max }) => AxisBounds {
                min: min.min(value),
                max: max.max(value),
            },
        })
    })
}

pub fn run(args: &InspectArgs) -> Result<(), Box<dyn Error>> {
    let coordinates = read_coordinates(&args.bank)?;
    let metric = Metric::for_frame(args.coord_frame);
    let templates: Vec<Template> = coordinates
        .iter()
        .map(|[x1, x2]| Template::new(*x1, *x2, &metric))
        .collect();
    let sorted_by = [NeighborhoodKey::X1, NeighborhoodKey::X2, NeighborhoodKey::Norm]
        .into_iter()
        .filter(|key| KeyView::new(&templates, *key).check_sorted().is_ok())
        .collect();

    let report = InspectReport {
        path: args.bank.display().to_string(),
        size: coordinates.len(),
        x1: axis_bounds(coordinates.iter().map(|point| point[0])),
        x2: axis_bounds(coordinates.iter().map(|point| point[1])),
        sorted_by,
        bank_hash: canonical_bank_hash(&coordinates),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
