//! One open observation file.

use std::{
    fs,
    io::{Read, Write},
    ops::Range,
    path::Path,
};

use bzip2::read::BzDecoder;

use crate::errors::BcoDataErr;

/// One open netCDF file, decompressed if it arrived as bz2.
pub(crate) struct Dataset {
    file: netcdf::File,
    // Temp file backing an in-memory payload, removed when the dataset is dropped.
    _decompressed: Option<tempfile::TempPath>,
}

impl Dataset {
    /// Open a file from the local filesystem, decompressing `.bz2` transparently.
    pub(crate) fn open(path: &Path) -> Result<Self, BcoDataErr> {
        if path.extension().map_or(false, |ext| ext == "bz2") {
            let compressed = fs::File::open(path)?;
            let mut bytes = vec![];
            BzDecoder::new(compressed).read_to_end(&mut bytes)?;
            Self::from_uncompressed_bytes(&bytes)
        } else {
            Ok(Dataset {
                file: netcdf::open(path)?,
                _decompressed: None,
            })
        }
    }

    /// Open a downloaded file from memory. The name decides whether the payload is
    /// bz2 compressed.
    pub(crate) fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, BcoDataErr> {
        if name.ends_with(".bz2") {
            let mut decompressed = vec![];
            BzDecoder::new(bytes).read_to_end(&mut decompressed)?;
            Self::from_uncompressed_bytes(&decompressed)
        } else {
            Self::from_uncompressed_bytes(bytes)
        }
    }

    // libnetcdf only opens named files, so in-memory payloads take a detour through
    // a temp file that lives exactly as long as the dataset.
    fn from_uncompressed_bytes(bytes: &[u8]) -> Result<Self, BcoDataErr> {
        let mut tmp = tempfile::NamedTempFile::new()?;
        tmp.write_all(bytes)?;
        let path = tmp.into_temp_path();
        let file = netcdf::open(&path)?;

        Ok(Dataset {
            file,
            _decompressed: Some(path),
        })
    }

    /// The record timestamps, seconds since the Unix epoch.
    pub(crate) fn times(&self) -> Result<Vec<f64>, BcoDataErr> {
        self.field_all("time").map(|(values, _)| values)
    }

    /// Read a whole variable, flattened row major, along with its row width.
    pub(crate) fn field_all(&self, field: &str) -> Result<(Vec<f64>, usize), BcoDataErr> {
        let var = self.variable(field)?;
        let values = var.get_values::<f64, _>(..)?;

        Ok((values, row_width(&var)))
    }

    /// Read a range of records of a variable, flattened row major, along with its
    /// row width. The range is clamped to the variable's record count, matching how
    /// array slicing behaves in the analysis tools the archive serves.
    pub(crate) fn field_rows(
        &self,
        field: &str,
        rows: Range<usize>,
    ) -> Result<(Vec<f64>, usize), BcoDataErr> {
        let var = self.variable(field)?;
        let dims = var.dimensions();

        let values = match dims.len() {
            0 => var.get_values::<f64, _>(..)?,
            rank => {
                let records = dims[0].len();
                let rows = rows.start.min(records)..rows.end.min(records);
                match rank {
                    1 => var.get_values::<f64, _>(rows)?,
                    2 => var.get_values::<f64, _>((rows, ..))?,
                    3 => var.get_values::<f64, _>((rows, .., ..))?,
                    _ => {
                        return Err(BcoDataErr::GeneralError(format!(
                            "variable {} has {} dimensions, at most 3 are supported",
                            field, rank
                        )))
                    }
                }
            }
        };

        Ok((values, row_width(&var)))
    }

    /// Read a global string attribute.
    pub(crate) fn global_attribute(&self, name: &str) -> Result<String, BcoDataErr> {
        let attr = self
            .file
            .attribute(name)
            .ok_or_else(|| BcoDataErr::MissingAttribute(name.to_string()))?;

        match attr.value()? {
            netcdf::AttributeValue::Str(value) => Ok(value),
            other => Err(BcoDataErr::GeneralError(format!(
                "global attribute {} is not a string: {:?}",
                name, other
            ))),
        }
    }

    fn variable(&self, field: &str) -> Result<netcdf::Variable, BcoDataErr> {
        self.file
            .variable(field)
            .ok_or_else(|| BcoDataErr::MissingVariable(field.to_string()))
    }
}

/// Values per record: the product of all non-record dimensions, 1 for plain series.
fn row_width(var: &netcdf::Variable) -> usize {
    var.dimensions()
        .iter()
        .skip(1)
        .map(|dim| dim.len())
        .product::<usize>()
        .max(1)
}
