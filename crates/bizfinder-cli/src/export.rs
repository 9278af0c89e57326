use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use bizfinder_core::NormalizedBusiness;

pub(crate) const CSV_HEADER: [&str; 6] = [
    "name",
    "address",
    "category",
    "website",
    "website_status",
    "data_status",
];

/// Writes `rows` as CSV to `writer`, header first, in the given order.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub(crate) fn write_csv<W: Write>(writer: W, rows: &[&NormalizedBusiness]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for business in rows {
        wtr.write_record([
            business.name.as_str(),
            business.address.as_str(),
            business.category.as_str(),
            business.website.as_deref().unwrap_or_default(),
            business.website_status(),
            business.data_status(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_csv_file(path: &Path, rows: &[&NormalizedBusiness]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file {}", path.display()))?;
    write_csv(file, rows).with_context(|| format!("failed to write CSV file {}", path.display()))
}
