//! Seed tables: the embedded mtcars subset and delimited-file loading

use std::path::Path;

use tracing::info;

use super::schema;
use crate::error::{BenchError, Result};
use crate::table::{Column, Table};

/// Motor Trend road tests, 1974: (model, mpg, cyl, hp)
const MTCARS: [(&str, f64, i64, f64); 32] = [
    ("Mazda RX4", 21.0, 6, 110.0),
    ("Mazda RX4 Wag", 21.0, 6, 110.0),
    ("Datsun 710", 22.8, 4, 93.0),
    ("Hornet 4 Drive", 21.4, 6, 110.0),
    ("Hornet Sportabout", 18.7, 8, 175.0),
    ("Valiant", 18.1, 6, 105.0),
    ("Duster 360", 14.3, 8, 245.0),
    ("Merc 240D", 24.4, 4, 62.0),
    ("Merc 230", 22.8, 4, 95.0),
    ("Merc 280", 19.2, 6, 123.0),
    ("Merc 280C", 17.8, 6, 123.0),
    ("Merc 450SE", 16.4, 8, 180.0),
    ("Merc 450SL", 17.3, 8, 180.0),
    ("Merc 450SLC", 15.2, 8, 180.0),
    ("Cadillac Fleetwood", 10.4, 8, 205.0),
    ("Lincoln Continental", 10.4, 8, 215.0),
    ("Chrysler Imperial", 14.7, 8, 230.0),
    ("Fiat 128", 32.4, 4, 66.0),
    ("Honda Civic", 30.4, 4, 52.0),
    ("Toyota Corolla", 33.9, 4, 65.0),
    ("Toyota Corona", 21.5, 4, 97.0),
    ("Dodge Challenger", 15.5, 8, 150.0),
    ("AMC Javelin", 15.2, 8, 150.0),
    ("Camaro Z28", 13.3, 8, 245.0),
    ("Pontiac Firebird", 19.2, 8, 175.0),
    ("Fiat X1-9", 27.3, 4, 66.0),
    ("Porsche 914-2", 26.0, 4, 91.0),
    ("Lotus Europa", 30.4, 4, 113.0),
    ("Ford Pantera L", 15.8, 8, 264.0),
    ("Ferrari Dino", 19.7, 6, 175.0),
    ("Maserati Bora", 15.0, 8, 335.0),
    ("Volvo 142E", 21.4, 4, 109.0),
];

/// The embedded 32-row seed table
pub fn mtcars() -> Table {
    Table::new(
        vec![
            schema::MODEL.into(),
            schema::MPG.into(),
            schema::CYL.into(),
            schema::HP.into(),
        ],
        vec![
            Column::new_sym(MTCARS.iter().map(|r| r.0)),
            Column::new_f64(MTCARS.iter().map(|r| r.1).collect()),
            Column::new_i64(MTCARS.iter().map(|r| r.2).collect()),
            Column::new_f64(MTCARS.iter().map(|r| r.3).collect()),
        ],
    )
}

/// Load a seed table from a delimited file with a header row
///
/// The header must name `mpg`, `cyl` and `hp`. The identifier is read from
/// a `model` column, or from an unnamed first column (the layout R writes
/// with `write.csv(mtcars)`). Extra columns are ignored.
pub fn load_seed_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| BenchError::Input(format!("cannot open seed {}: {}", path.display(), e)))?;

    let headers = reader
        .headers()
        .map_err(|e| BenchError::Input(format!("cannot read seed header: {}", e)))?
        .clone();
    let position = |name: &str| headers.iter().position(|h| h == name);
    let model_idx = position(schema::MODEL)
        .or_else(|| (headers.get(0) == Some("")).then_some(0))
        .ok_or_else(|| missing(schema::MODEL))?;
    let mpg_idx = position(schema::MPG).ok_or_else(|| missing(schema::MPG))?;
    let cyl_idx = position(schema::CYL).ok_or_else(|| missing(schema::CYL))?;
    let hp_idx = position(schema::HP).ok_or_else(|| missing(schema::HP))?;

    let mut models = Vec::new();
    let mut mpg = Vec::new();
    let mut cyl = Vec::new();
    let mut hp = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|e| BenchError::Input(format!("malformed seed row: {}", e)))?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |idx: usize| {
            record.get(idx).ok_or_else(|| {
                BenchError::Input(format!("line {}: missing field {}", line, idx + 1))
            })
        };

        models.push(field(model_idx)?.to_string());
        mpg.push(parse_f64(field(mpg_idx)?, schema::MPG, line)?);
        cyl.push(parse_group_key(field(cyl_idx)?, line)?);
        hp.push(parse_f64(field(hp_idx)?, schema::HP, line)?);
    }

    if models.is_empty() {
        return Err(BenchError::Input(format!("seed {} has no rows", path.display())));
    }
    info!(path = %path.display(), rows = models.len(), "loaded seed table");

    Table::try_new(
        vec![
            schema::MODEL.into(),
            schema::MPG.into(),
            schema::CYL.into(),
            schema::HP.into(),
        ],
        vec![
            Column::new_sym(models),
            Column::new_f64(mpg),
            Column::new_i64(cyl),
            Column::new_f64(hp),
        ],
    )
}

fn missing(name: &str) -> BenchError {
    BenchError::Input(format!("seed header has no `{}` column", name))
}

fn parse_f64(raw: &str, column: &str, line: u64) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| {
        BenchError::Input(format!("line {}: `{}` is not a number in `{}`", line, raw, column))
    })
}

/// Group keys may be written as `6` or `6.0`; anything fractional is rejected
fn parse_group_key(raw: &str, line: u64) -> Result<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    let v = parse_f64(raw, schema::CYL, line)?;
    if v.fract() != 0.0 || !v.is_finite() {
        return Err(BenchError::Input(format!(
            "line {}: group key `{}` is not integral",
            line, raw
        )));
    }
    Ok(v as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mtcars_shape() {
        let t = mtcars();
        assert_eq!(t.row_count(), 32);
        assert_eq!(t.col_count(), 4);
        super::super::check_schema(&t).unwrap();
    }

    #[test]
    fn test_load_named_columns() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "model,mpg,cyl,disp,hp").unwrap();
        writeln!(f, "Datsun 710,22.8,4,108,93").unwrap();
        writeln!(f, "Valiant,18.1,6.0,225,105").unwrap();

        let t = load_seed_csv(f.path()).unwrap();
        assert_eq!(t.row_count(), 2);
        assert_eq!(t.i64("cyl").unwrap(), &[4, 6]);
        assert_eq!(t.f64("hp").unwrap(), &[93.0, 105.0]);
    }

    #[test]
    fn test_load_unnamed_identifier_column() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "\"\",\"mpg\",\"cyl\",\"hp\"").unwrap();
        writeln!(f, "\"Fiat 128\",32.4,4,66").unwrap();

        let t = load_seed_csv(f.path()).unwrap();
        assert_eq!(&*t.sym("model").unwrap()[0], "Fiat 128");
    }

    #[test]
    fn test_load_rejects_bad_number() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "model,mpg,cyl,hp").unwrap();
        writeln!(f, "Broken,fast,4,66").unwrap();

        let err = load_seed_csv(f.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{}", err);
    }

    #[test]
    fn test_load_rejects_missing_column() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "model,mpg,hp").unwrap();
        writeln!(f, "Fiat 128,32.4,66").unwrap();

        assert!(matches!(load_seed_csv(f.path()), Err(BenchError::Input(_))));
    }

    #[test]
    fn test_load_rejects_header_only() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "model,mpg,cyl,hp").unwrap();

        assert!(matches!(load_seed_csv(f.path()), Err(BenchError::Input(_))));
    }
}
