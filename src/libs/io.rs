use crate::libs::atu::Atu;
use crate::libs::block::DenseTile;
use crate::libs::error::{HictError, Result};
use itertools::Itertools;
use std::io::{BufRead, BufReader, Write};

/// Open a file for reading; `stdin` reads standard input and `.gz` files are
/// decompressed.
pub fn reader(input: &str) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Read ATUs, one per line.
///
/// A line is either tab-separated `stripe start end strand` or the notation
/// `stripe(strand):start-end`. Blank lines and `#` comments are skipped.
///
/// ```
/// let input = "# order\n1\t0\t5\t+\n1(+):5-10\n\n2\t0\t3\t-\n";
/// let atus = hict::libs::io::read_atus(input.as_bytes()).unwrap();
/// assert_eq!(atus.len(), 3);
/// assert_eq!(atus[1].to_string(), "1(+):5-10");
/// ```
pub fn read_atus<R: BufRead>(reader: R) -> Result<Vec<Atu>> {
    let mut atus = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let atu = parse_atu_line(line).map_err(|e| HictError::parse(i + 1, e.to_string()))?;
        atus.push(atu);
    }
    Ok(atus)
}

fn parse_atu_line(line: &str) -> Result<Atu> {
    let fields: Vec<&str> = line.split('\t').collect();
    match fields.len() {
        1 => fields[0].parse(),
        4 => {
            let number = |s: &str| -> Result<u64> {
                s.trim()
                    .parse::<u64>()
                    .map_err(|e| HictError::invalid_atu(format!("{}: {}", s, e)))
            };
            Atu::new(
                number(fields[0])?,
                number(fields[1])?,
                number(fields[2])?,
                fields[3].trim().parse()?,
            )
        }
        n => Err(HictError::invalid_atu(format!(
            "expected 1 or 4 fields, found {}",
            n
        ))),
    }
}

/// Write ATUs as tab-separated `stripe start end strand` lines
pub fn write_atus<W: Write + ?Sized>(writer: &mut W, atus: &[Atu]) -> Result<()> {
    for atu in atus {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            atu.stripe(),
            atu.start(),
            atu.end(),
            atu.direction().strand()
        )?;
    }
    Ok(())
}

/// Write a tile as rows of tab-separated counts
pub fn write_tile<W: Write + ?Sized>(writer: &mut W, tile: &DenseTile) -> Result<()> {
    for row in tile.row_iter() {
        writeln!(writer, "{}", row.iter().join("\t"))?;
    }
    Ok(())
}

/// Write the nonzero entries of a tile as `row col value` lines, row-major
pub fn write_tile_sparse<W: Write + ?Sized>(writer: &mut W, tile: &DenseTile) -> Result<()> {
    for (r, row) in tile.row_iter().enumerate() {
        for (c, v) in row.iter().enumerate() {
            if *v != 0 {
                writeln!(writer, "{}\t{}\t{}", r, c, v)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::atu::Direction;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_read_atus_errors() {
        let res = read_atus("1\t0\t5\t+\n1\t5\t5\t+\n".as_bytes());
        assert!(matches!(res, Err(HictError::Parse { line: 2, .. })));

        let res = read_atus("1\t0\t5\n".as_bytes());
        assert!(matches!(res, Err(HictError::Parse { line: 1, .. })));

        let res = read_atus("1\t0\t5\t*\n".as_bytes());
        assert!(res.unwrap_err().to_string().contains("unknown direction"));
    }

    #[test]
    fn test_reader_gz() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("order.tsv.gz");
        let file = std::fs::File::create(&path)?;
        let mut encoder = GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(b"3\t0\t4\t-\n")?;
        encoder.finish()?;

        let atus = read_atus(reader(path.to_str().unwrap())?)?;
        assert_eq!(atus, vec![Atu::new(3, 0, 4, Direction::Reverse)?]);

        assert!(reader(dir.path().join("missing.tsv").to_str().unwrap()).is_err());
        Ok(())
    }

    #[test]
    fn test_write() -> Result<()> {
        let atus = vec![
            Atu::new(1, 0, 10, Direction::Forward)?,
            Atu::new(2, 0, 3, Direction::Reverse)?,
        ];
        let mut buf = Vec::new();
        write_atus(&mut buf, &atus)?;
        assert_eq!(String::from_utf8(buf).unwrap(), "1\t0\t10\t+\n2\t0\t3\t-\n");

        let tile = DenseTile::from_row_slice(2, 2, &[0, 4, 4, 1]);
        let mut buf = Vec::new();
        write_tile(&mut buf, &tile)?;
        assert_eq!(String::from_utf8(buf).unwrap(), "0\t4\n4\t1\n");

        let mut buf = Vec::new();
        write_tile_sparse(&mut buf, &tile)?;
        assert_eq!(String::from_utf8(buf).unwrap(), "0\t1\t4\n1\t0\t4\n1\t1\t1\n");
        Ok(())
    }
}
