//! Export helpers for matching-chart CSV and JSON report artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod chart {
    use std::io::Write;

    use serde::Serialize;

    /// Label used for the design point row.
    pub const DESIGN_POINT: &str = "design_point";

    /// One matching-chart sample. The header is derived from the field names.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize)]
    pub struct Row<'a> {
        pub constraint: &'a str,
        pub wing_loading_lb_ft2: f64,
        pub power_loading_lb_hp: f64,
    }

    /// Write curve rows followed by an optional design-point row.
    pub fn write_rows<'a, W: Write>(
        writer: W,
        rows: impl IntoIterator<Item = Row<'a>>,
        design_point: Option<(f64, f64)>,
    ) -> csv::Result<usize> {
        let mut csv = csv::Writer::from_writer(writer);
        let mut written = 0;
        for row in rows {
            csv.serialize(row)?;
            written += 1;
        }
        if let Some((wing_loading, power_loading)) = design_point {
            csv.serialize(Row {
                constraint: DESIGN_POINT,
                wing_loading_lb_ft2: wing_loading,
                power_loading_lb_hp: power_loading,
            })?;
            written += 1;
        }
        csv.flush()?;
        Ok(written)
    }
}

pub mod report {
    use std::fs::{self, File};
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};

    use serde::Serialize;
    use serde_json::{to_writer, to_writer_pretty};

    /// Serialise any report as JSON, pretty-printed when `pretty` is set.
    pub fn write_json<T: Serialize, W: Write>(
        mut writer: W,
        value: &T,
        pretty: bool,
    ) -> io::Result<()> {
        if pretty {
            to_writer_pretty(&mut writer, value)?;
        } else {
            to_writer(&mut writer, value)?;
        }
        writeln!(writer)?;
        writer.flush()
    }

    /// Write `value` next to `output` as `<stem>_report.json` and return its path.
    pub fn write_sidecar<T: Serialize>(output: &Path, value: &T) -> io::Result<PathBuf> {
        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let stem = output
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sizing");
        let path = parent.join(format!("{stem}_report.json"));
        write_json(File::create(&path)?, value, true)?;
        Ok(path)
    }
}
