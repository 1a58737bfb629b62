use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use dezenas_core::analysis::AnalysisReport;
use dezenas_core::models::{Game, Variant};

/// `Jogos_Quina_120x5dz_Garant3.csv` for 120 games of 5 numbers; unknown draw sizes are "Personalizado".
pub fn default_games_filename(games: usize, draw_size: u8, guaranteed: u8) -> String {
    let name = Variant::from_draw_size(draw_size).map_or("Personalizado", |v| v.name());
    format!("Jogos_{}_{}x{}dz_Garant{}.csv", name, games, draw_size, guaranteed)
}

pub fn write_games<W: Write>(writer: W, games: &[Game], delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let width = games.first().map_or(0, Game::len);
    let header: Vec<String> = (1..=width).map(|i| format!("Dezena {}", i)).collect();
    wtr.write_record(&header)?;

    for game in games {
        wtr.write_record(game.numbers().iter().map(|n| n.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_games(path: &Path, games: &[Game], delimiter: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Não foi possível criar {:?}", path))?;
    write_games(file, games, delimiter)
}

/// One line per past draw: draw numbers, hits per tier and prize values.
pub fn write_breakdown<W: Write>(writer: W, report: &AnalysisReport, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    let mut header = vec!["Sorteio".to_string(), "Dezenas".to_string()];
    header.extend(report.tiers.iter().map(|t| t.tier.name.to_string()));
    header.push("Premio".to_string());
    header.push("Premio sem faixa principal".to_string());
    wtr.write_record(&header)?;

    for draw in &report.breakdown {
        let numbers = draw
            .numbers
            .iter()
            .map(|n| format!("{:02}", n))
            .collect::<Vec<_>>()
            .join(" ");
        let mut record = vec![draw.index.to_string(), numbers];
        record.extend(draw.hits.iter().map(|h| h.to_string()));
        record.push(format!("{:.2}", draw.prize));
        record.push(format!("{:.2}", draw.prize_excluding_top));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_breakdown(path: &Path, report: &AnalysisReport, delimiter: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Não foi possível criar {:?}", path))?;
    write_breakdown(file, report, delimiter)
}

#[derive(Serialize)]
struct ReportFile<'a> {
    generated_at: String,
    report: &'a AnalysisReport,
}

pub fn write_report_json<W: Write>(writer: W, report: &AnalysisReport) -> Result<()> {
    let file = ReportFile {
        generated_at: chrono::Local::now().to_rfc3339(),
        report,
    };
    serde_json::to_writer_pretty(writer, &file)?;
    Ok(())
}

pub fn save_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Não foi possível criar {:?}", path))?;
    write_report_json(file, report)
}
