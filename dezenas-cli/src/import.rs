use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use dezenas_core::models::HistoricalDraw;

/// A CSV line reduced to its valid numbers. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberRow {
    pub line: usize,
    pub numbers: Vec<u8>,
}

/// Integer cells of every record, with the record's 1-based line. Other cells are dropped.
fn read_integer_cells<R: Read>(reader: R, delimiter: u8) -> Result<Vec<(usize, Vec<u32>)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Erro lendo o registro {}", i + 1))?;
        let line = record.position().map_or(i + 1, |p| p.line() as usize);
        let cells = record
            .iter()
            .filter_map(|cell| cell.parse::<u32>().ok())
            .collect();
        rows.push((line, cells));
    }
    Ok(rows)
}

/// Reads rows of numbers. Cells that are not integers in `1..=pool_size` are dropped,
/// and so are rows left empty.
pub fn read_number_rows<R: Read>(reader: R, delimiter: u8, pool_size: u8) -> Result<Vec<NumberRow>> {
    let rows = read_integer_cells(reader, delimiter)?
        .into_iter()
        .filter_map(|(line, cells)| {
            let numbers: Vec<u8> = cells
                .into_iter()
                .filter_map(|n| u8::try_from(n).ok())
                .filter(|n| (1..=pool_size).contains(n))
                .collect();
            (!numbers.is_empty()).then_some(NumberRow { line, numbers })
        })
        .collect();
    Ok(rows)
}

pub fn load_number_rows(path: &Path, delimiter: u8, pool_size: u8) -> Result<Vec<NumberRow>> {
    let file = File::open(path).with_context(|| format!("Não foi possível abrir {:?}", path))?;
    read_number_rows(file, delimiter, pool_size)
        .with_context(|| format!("Arquivo inválido: {:?}", path))
}

/// Reads games to reuse. Every integer from 1 up is kept as written, so a game holding a
/// number outside the pool stays whole and is rejected by the generator. Rows holding a
/// number no pool can contain (above 255) are dropped.
pub fn read_existing_games<R: Read>(reader: R, delimiter: u8) -> Result<Vec<NumberRow>> {
    let mut rows = Vec::new();
    for (line, cells) in read_integer_cells(reader, delimiter)? {
        let numbers: Option<Vec<u8>> = cells
            .into_iter()
            .filter(|&n| n >= 1)
            .map(|n| u8::try_from(n).ok())
            .collect();
        match numbers {
            Some(numbers) if !numbers.is_empty() => rows.push(NumberRow { line, numbers }),
            Some(_) => {}
            None => log::debug!("linha {} ignorada: dezena acima de {}", line, u8::MAX),
        }
    }
    Ok(rows)
}

pub fn load_existing_games(path: &Path, delimiter: u8) -> Result<Vec<NumberRow>> {
    let file = File::open(path).with_context(|| format!("Não foi possível abrir {:?}", path))?;
    read_existing_games(file, delimiter).with_context(|| format!("Arquivo inválido: {:?}", path))
}

pub struct DrawImport {
    pub draws: Vec<HistoricalDraw>,
    pub skipped: usize,
}

/// Keeps rows with exactly `draw_size` distinct numbers, numbered 1, 2, ... in file order.
pub fn historical_draws(rows: Vec<NumberRow>, draw_size: usize) -> DrawImport {
    let mut draws = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in rows {
        let mut distinct = row.numbers.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if row.numbers.len() == draw_size && distinct.len() == draw_size {
            draws.push(HistoricalDraw::new(draws.len() + 1, distinct));
        } else {
            log::debug!("linha {} ignorada: {} dezenas", row.line, row.numbers.len());
            skipped += 1;
        }
    }
    DrawImport { draws, skipped }
}

pub fn into_numbers(rows: Vec<NumberRow>) -> Vec<Vec<u8>> {
    rows.into_iter().map(|r| r.numbers).collect()
}

pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ => match s.as_bytes() {
            [b] => Ok(*b),
            _ => Err(format!("delimitador deve ser um único caractere: '{}'", s)),
        },
    }
}

/// "1, 2,3 5" -> [1, 2, 3, 5]
pub fn parse_number_list(s: &str) -> Result<Vec<u8>, String> {
    s.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(|t| t.parse::<u8>().map_err(|_| format!("dezena inválida: '{}'", t)))
        .collect()
}
