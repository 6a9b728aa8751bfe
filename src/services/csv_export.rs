use std::io::Write;

use anyhow::Result;
use csv::Writer;

use crate::application::FarmInfoInternalApplication;

/// Write one CSV row per application, headed by the flattened column names
pub fn write_applications_csv<W: Write>(
    records: &[FarmInfoInternalApplication],
    writer: W,
) -> Result<usize> {
    let mut wtr = Writer::from_writer(writer);

    let header: Vec<String> = FarmInfoInternalApplication::default()
        .to_row()
        .into_keys()
        .collect();
    wtr.write_record(&header)?;

    for record in records {
        let row = record.to_row();
        wtr.write_record(header.iter().map(|column| {
            row.get(column).map(String::as_str).unwrap_or_default()
        }))?;
    }

    wtr.flush()?;
    Ok(records.len())
}

pub fn render_applications_csv(records: &[FarmInfoInternalApplication]) -> Result<String> {
    let mut buffer = Vec::new();
    write_applications_csv(records, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{WaterSource, YesNo};

    #[test]
    fn test_header_and_rows() {
        let mut first = FarmInfoInternalApplication::new(1);
        first.water_source = WaterSource::Surface("Mill creek, north pump".to_string());
        let mut second = FarmInfoInternalApplication::new(2);
        second.wild_areas = YesNo::No;

        let csv = render_applications_csv(&[first, second]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("farmId,totalAcreage,"));
        assert!(lines[1].contains("surface,\"Mill creek, north pump\""));
        assert!(lines[2].starts_with("2,"));
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let csv = render_applications_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
